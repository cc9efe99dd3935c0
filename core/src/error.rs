//! Error bodies returned by the cluster.

use serde::{Deserialize, Serialize};

/// A single `error` object, possibly nested through `caused_by`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCause {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub root_cause: Vec<ErrorCause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_uuid: Option<String>,
    #[serde(
        default,
        rename = "resource.type",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_type: Option<String>,
    #[serde(
        default,
        rename = "resource.id",
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<Box<ErrorCause>>,
}

impl ErrorCause {
    pub fn new(
        kind: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            reason: Some(reason.into()),
            root_cause: vec![],
            index: None,
            index_uuid: None,
            resource_type: None,
            resource_id: None,
            caused_by: None,
        }
    }
}

impl std::fmt::Display for ErrorCause {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {}", self.kind, reason),
            None => f.write_str(&self.kind),
        }
    }
}

/// Decoded error body of a non-2xx response.
///
/// The cluster answers with either a structured `error` object or a plain
/// message; proxies and misconfigured endpoints answer with anything at all,
/// which is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorResponse {
    Structured { error: ErrorCause, status: u16 },
    Message { error: String, status: u16 },
    Raw(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope {
    Structured { error: ErrorCause, status: u16 },
    Message { error: String, status: u16 },
}

impl ErrorResponse {
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Envelope>(body) {
            Ok(Envelope::Structured { error, status }) => Self::Structured { error, status },
            Ok(Envelope::Message { error, status }) => Self::Message { error, status },
            Err(_) => Self::Raw(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Status reported inside the body, when the body carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Structured { status, .. } | Self::Message { status, .. } => Some(*status),
            Self::Raw(..) => None,
        }
    }

    /// Exception type, e.g. `index_not_found_exception`.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Structured { error, .. } => Some(&error.kind),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Structured { error, .. } => error.reason.as_deref(),
            Self::Message { error, .. } => Some(error),
            Self::Raw(..) => None,
        }
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::Structured { error, status } => write!(f, "[{status}] {error}"),
            Self::Message { error, status } => write!(f, "[{status}] {error}"),
            Self::Raw(body) if body.is_empty() => f.write_str("empty response body"),
            Self::Raw(body) => f.write_str(body),
        }
    }
}
