use osapi_client::{
    Client, Config, Error, Inspectable,
    core::{AliasPutBody, AliasPutReq, IndicesExistsReq, InfoReq},
};
use osapi_testing::{StubReply, StubServer, logging};
use secrecy::SecretString;
use serde_json::json;
use url::Url;

fn ack() -> StubReply {
    StubReply::json(200, &json!({"acknowledged": true}))
}

fn put_req() -> AliasPutReq {
    AliasPutReq {
        indices: vec!["logs".into()],
        alias: "recent".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn retries_unavailable_then_succeeds() {
    logging();
    let server = StubServer::with_replies(vec![StubReply::new(503, "")], ack());

    let resp = server
        .client()
        .alias()
        .put(&put_req())
        .await
        .unwrap();

    assert!(resp.acknowledged);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    logging();
    let server = StubServer::start(StubReply::new(503, "unavailable"));
    let mut config = server.config();
    config.max_retries = 2;

    let err = Client::new(&config)
        .unwrap()
        .alias()
        .put(&put_req())
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|it| it.as_u16()), Some(503));
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn does_not_retry_server_errors() {
    logging();
    let server = StubServer::failing();

    let err = server
        .client()
        .alias()
        .put(&put_req())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Api { .. }));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn disabled_retry_sends_once() {
    logging();
    let server = StubServer::start(StubReply::new(503, ""));
    let mut config = server.config();
    config.disable_retry = true;

    let _ = Client::new(&config)
        .unwrap()
        .alias()
        .put(&put_req())
        .await;
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn round_robin_over_addresses() {
    logging();
    let first = StubServer::start(ack());
    let second = StubServer::start(ack());
    let client = Client::new(&Config::new(vec![first.url(), second.url()])).unwrap();

    for _ in 0..4 {
        client.alias().put(&put_req()).await.unwrap();
    }

    assert_eq!(first.requests().len(), 2);
    assert_eq!(second.requests().len(), 2);
}

#[tokio::test]
async fn sends_basic_auth_and_user_agent() {
    logging();
    let server = StubServer::start(StubReply::new(200, ""));
    let config = server
        .config()
        .with_basic_auth("admin", SecretString::from("secret"));
    let user_agent = config.user_agent.clone();

    let exists = Client::new(&config)
        .unwrap()
        .indices()
        .exists(&IndicesExistsReq {
            indices: vec!["logs".into()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(*exists);

    let requests = server.requests();
    let headers = &requests[0].headers;
    assert_eq!(requests[0].method, "HEAD");
    assert_eq!(
        headers.get("authorization").map(String::as_str),
        Some("Basic YWRtaW46c2VjcmV0")
    );
    assert_eq!(headers.get("user-agent"), Some(&user_agent));
}

#[tokio::test]
async fn sends_json_body_and_query() {
    logging();
    let server = StubServer::start(ack());

    let mut req = put_req();
    req.body = Some(AliasPutBody {
        is_write_index: Some(true),
        ..Default::default()
    });
    req.params.timeouts.timeout = Some(std::time::Duration::from_secs(5));
    req.params.common.pretty = true;

    server.client().alias().put(&req).await.unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/logs/_alias/recent");
    assert_eq!(request.query, "timeout=5000ms&pretty=true");
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&request.body).unwrap(),
        json!({"is_write_index": true})
    );
}

#[tokio::test]
async fn undecodable_body_keeps_response() {
    logging();
    let server = StubServer::start(StubReply::new(200, "not json"));

    let err = server
        .client()
        .info(&InfoReq::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    let response = err.inspect().response.unwrap();
    assert_eq!(response.body().as_ref(), b"not json");
}

#[tokio::test]
async fn unexpected_exists_status_is_error() {
    logging();
    let server = StubServer::start(StubReply::new(403, ""));

    let err = server
        .client()
        .indices()
        .exists(&IndicesExistsReq {
            indices: vec!["logs".into()],
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|it| it.as_u16()), Some(403));
}

#[tokio::test]
async fn connection_refused_has_no_response() {
    logging();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = Config::new(vec![Url::parse(&format!("http://{addr}")).unwrap()]);
    config.max_retries = 1;

    let err = Client::new(&config)
        .unwrap()
        .info(&InfoReq::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(..)));
    assert!(err.inspect().response.is_none());
}
