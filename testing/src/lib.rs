mod mock;
mod server;
mod stub;
#[cfg(feature = "live")]
pub mod tst;

use std::ops::Deref;

use osapi_client::{ApiResponse, Client, Config, Inspect, RawResponse};
use secrecy::SecretString;
use serde::Serialize;
use tracing::Level;
use url::Url;

pub use insta::{assert_json_snapshot, with_settings};

pub use crate::{
    mock::{CLUSTER_NAME, MockOpenSearch, NODE_NAME},
    stub::{FAILING_BODY, RecordedRequest, StubReply, StubServer},
};

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_SECURE_URL: &str = "https://localhost:9200";
pub const ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// JSON snapshot with object keys sorted.
#[macro_export]
macro_rules! assert_sorted_json_snapshot {
    ($($arg:tt)*) => {
        $crate::with_settings!({sort_maps => true}, {
            $crate::assert_json_snapshot!($($arg)*)
        })
    };
}

pub fn logging() {
    use std::sync::Once;

    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .try_init();
    });
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|it| it.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Client settings for a live cluster, taken from the environment.
///
/// `OPENSEARCH_URL` overrides the address. With `SECURE_INTEGRATION=true`
/// the default address switches to https, requests authenticate as
/// `admin` with `OPENSEARCH_INITIAL_ADMIN_PASSWORD` and certificates are
/// not verified.
pub fn client_config() -> Config {
    let secure = env_flag("SECURE_INTEGRATION");
    let address = std::env::var("OPENSEARCH_URL").unwrap_or_else(|_| {
        if secure {
            DEFAULT_SECURE_URL.into()
        } else {
            DEFAULT_URL.into()
        }
    });

    let mut config = Config::new(vec![Url::parse(&address).expect("OPENSEARCH_URL is a valid URL")]);
    if secure {
        let password = std::env::var("OPENSEARCH_INITIAL_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into());
        config = config.with_basic_auth(ADMIN_USER, SecretString::from(password));
        config.insecure_skip_verify = true;
    }
    config
}

pub fn new_client() -> Client {
    Client::new(&client_config()).expect("live client")
}

/// A client whose only endpoint answers every request with a 500.
pub struct FailingClient {
    pub client: Client,
    pub server: StubServer,
}

impl Deref for FailingClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

pub fn create_failing_client() -> FailingClient {
    let server = StubServer::failing();
    let mut config = server.config();
    config.disable_retry = true;

    FailingClient {
        client: Client::new(&config).expect("failing client"),
        server,
    }
}

/// Checks the raw view of a call made through [`create_failing_client`].
pub fn verify_inspect(
    inspect: Inspect<'_>,
    expect_body: bool,
) -> &RawResponse {
    let response = inspect
        .response
        .expect("failed call keeps its response");

    assert_eq!(response.status().as_u16(), 500);
    if expect_body {
        assert!(
            !response.body().is_empty(),
            "failing response has an empty body"
        );
    }
    response
}

/// Asserts the parsed body serializes back to the same JSON the server sent.
pub fn compare_raw_json_with_parsed_json<T: Serialize>(resp: &ApiResponse<T>) {
    let raw = resp
        .raw()
        .json()
        .expect("raw body is JSON");
    let parsed = serde_json::to_value(resp.body()).expect("parsed body serializes");

    assert_eq!(raw, parsed, "parsed body differs from raw body");
}

#[cfg(test)]
mod tests {
    use osapi_client::{
        Inspectable,
        core::{AliasPutReq, IndicesCreateReq},
    };

    use super::*;

    #[tokio::test]
    async fn failing_client_answers_500() {
        logging();
        let failing = create_failing_client();

        let err = failing
            .indices()
            .create(&IndicesCreateReq {
                index: "logs".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        let response = verify_inspect(err.inspect(), true);
        assert_eq!(response.body().as_ref(), FAILING_BODY.as_bytes());
        assert_eq!(failing.server.requests().len(), 1);
    }

    #[tokio::test]
    async fn parsed_put_matches_raw() {
        logging();
        let mock = MockOpenSearch::start();
        let client = mock.client();

        client
            .indices()
            .create(&IndicesCreateReq {
                index: "logs".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let resp = client
            .alias()
            .put(&AliasPutReq {
                indices: vec!["logs".into()],
                alias: "recent".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        compare_raw_json_with_parsed_json(&resp);
        assert!(mock.aliases("logs").unwrap().contains_key("recent"));
    }
}
