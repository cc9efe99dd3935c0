//! Scripted HTTP endpoint: answers from a queue of canned replies and
//! records every request it sees.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Mutex, PoisonError},
};

use actix_web::{
    HttpRequest, HttpResponse,
    http::{Method, StatusCode},
    web,
};
use osapi_client::{Client, Config};
use url::Url;

use crate::server::{Running, spawn};

/// Body the failing endpoint answers with.
pub const FAILING_BODY: &str = r#"{"status": "error", "reason": "Test Failing Client Response"}"#;

#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
}

impl StubReply {
    pub fn new(
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(
        status: u16,
        body: &serde_json::Value,
    ) -> Self {
        Self::new(status, body.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

struct StubState {
    queue: Mutex<VecDeque<StubReply>>,
    fallback: StubReply,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct StubServer {
    running: Running,
    state: web::Data<StubState>,
}

impl StubServer {
    /// Answers every request with `fallback` once the queue is empty.
    pub fn start(fallback: StubReply) -> Self {
        Self::with_replies(vec![], fallback)
    }

    pub fn with_replies(
        replies: Vec<StubReply>,
        fallback: StubReply,
    ) -> Self {
        let state = web::Data::new(StubState {
            queue: Mutex::new(replies.into()),
            fallback,
            requests: Mutex::new(vec![]),
        });

        let app_state = state.clone();
        let running = spawn("osapi-stub", move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(app_state.clone())
                .route("/{tail:.*}", web::route().to(reply));
        });

        Self { running, state }
    }

    /// The always-500 endpoint used to exercise error inspection.
    pub fn failing() -> Self {
        Self::start(StubReply::new(500, FAILING_BODY))
    }

    pub fn url(&self) -> Url {
        self.running.url()
    }

    pub fn config(&self) -> Config {
        Config::new(vec![self.url()])
    }

    pub fn client(&self) -> Client {
        Client::new(&self.config()).expect("stub client")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

async fn reply(
    state: web::Data<StubState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let headers = req
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: req.method().to_string(),
            path: req.path().to_string(),
            query: req.query_string().to_string(),
            headers,
            body: body.to_vec(),
        });

    let reply = state
        .queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
        .unwrap_or_else(|| state.fallback.clone());

    let mut response =
        HttpResponse::build(StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));

    if req.method() == Method::HEAD {
        return response.finish();
    }

    response
        .content_type("application/json")
        .body(reply.body)
}
