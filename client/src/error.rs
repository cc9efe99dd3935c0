use osapi_core::ErrorResponse;
use reqwest::StatusCode;

use crate::{Inspect, Inspectable, RawResponse};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("'{0}' cannot be used as a base address")]
    Url(url::Url),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {error}")]
    Api {
        status: StatusCode,
        error: ErrorResponse,
        response: Box<RawResponse>,
    },
    #[error("failed to decode {} response: {source}", .response.status())]
    Decode {
        source: serde_json::Error,
        response: Box<RawResponse>,
    },
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid config: {0}")]
    InvalidConfig(validator::ValidationErrors),
}

impl Error {
    /// Wraps a non-2xx response, decoding whatever error body it carries.
    pub(crate) fn api(response: RawResponse) -> Self {
        let error = ErrorResponse::parse(response.body());
        tracing::debug!(
            status = %response.status(),
            url = %response.url(),
            "request failed: {}",
            error
        );
        Self::Api {
            status: response.status(),
            error,
            response: Box::new(response),
        }
    }

    /// The response behind this error, if the request got that far.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::Api { response, .. } | Self::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(RawResponse::status)
    }

    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl Inspectable for Error {
    fn inspect(&self) -> Inspect<'_> {
        Inspect {
            response: self.response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use reqwest::{Method, header::HeaderMap};

    use super::*;

    fn raw(
        status: u16,
        body: &'static [u8],
    ) -> RawResponse {
        RawResponse::new(
            Method::GET,
            url::Url::parse("http://localhost:9200/_alias/a").unwrap(),
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from_static(body),
        )
    }

    #[test]
    fn api_error_keeps_response() {
        let err = Error::api(raw(
            404,
            br#"{"error":"alias [a] missing","status":404}"#,
        ));

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(
            err.error_response().and_then(ErrorResponse::reason),
            Some("alias [a] missing")
        );
        let inspect = err.inspect();
        let response = inspect.response.expect("response is kept");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.body().is_empty());
        assert_eq!(err.to_string(), "404 Not Found: [404] alias [a] missing");
    }

    #[test]
    fn validation_error_has_nothing_to_inspect() {
        let err = Error::Validation(validator::ValidationErrors::new());
        assert!(err.inspect().response.is_none());
        assert!(err.status().is_none());
    }

    #[test]
    fn decode_error_keeps_response() {
        let source = serde_json::from_slice::<serde_json::Value>(b"not json").unwrap_err();
        let err = Error::Decode {
            source,
            response: Box::new(raw(200, b"not json")),
        };
        assert_eq!(err.status(), Some(StatusCode::OK));
        assert!(err.error_response().is_none());
        assert!(err.inspect().response.is_some());
    }
}
