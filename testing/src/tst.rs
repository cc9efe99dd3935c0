use std::time::Duration;

use osapi_client::{Client, Config, core::InfoReq};
use testcontainers::{
    ContainerAsync, GenericImage, ImageExt,
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
};
use url::Url;

/// Single-node cluster in a container, security plugin disabled.
pub struct TestOpenSearchCtx {
    pub container: ContainerAsync<GenericImage>,
    pub conf: Config,
    pub client: Client,
}

impl TestOpenSearchCtx {
    const IMAGE: &'static str = "opensearchproject/opensearch";
    const TAG: &'static str = "2.19.1";

    pub async fn new() -> Self {
        let container = GenericImage::new(Self::IMAGE, Self::TAG)
            .with_exposed_port(9200.tcp())
            .with_wait_for(WaitFor::message_on_stdout("started"))
            .with_env_var("discovery.type", "single-node")
            .with_env_var("DISABLE_SECURITY_PLUGIN", "true")
            .with_env_var("DISABLE_INSTALL_DEMO_CONFIG", "true")
            .with_env_var("OPENSEARCH_JAVA_OPTS", "-Xms512m -Xmx512m")
            .start()
            .await
            .expect("Failed to start opensearch");

        let host_port = container
            .get_host_port_ipv4(9200)
            .await
            .unwrap();

        let conf = Config::new(vec![
            Url::parse(&format!("http://127.0.0.1:{host_port}")).unwrap(),
        ]);
        let client = Client::new(&conf).unwrap();

        let mut attempts = 0;
        loop {
            attempts += 1;
            match client.info(&InfoReq::default()).await {
                Ok(_) => break,
                Err(err) if attempts < 60 => {
                    tracing::debug!(attempts, "cluster not ready: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                },
                Err(err) => panic!("cluster never became ready: {err}"),
            }
        }

        Self {
            container,
            conf,
            client,
        }
    }
}
