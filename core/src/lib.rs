//! Wire model for the OpenSearch index and alias endpoints.
//!
//! Requests describe themselves as a method, a list of path segments and a
//! query; responses are plain serde types. Nothing in this crate performs
//! I/O, sending is left to `osapi-client`.

pub mod alias;
pub mod error;
pub mod indices;
pub mod info;
pub mod params;

pub use alias::*;
pub use error::{ErrorCause, ErrorResponse};
pub use indices::*;
pub use info::*;
pub use params::CommonParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Head,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Head => "HEAD",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that can be turned into a single HTTP exchange.
///
/// Validation runs before the request is built, so `path` may assume the
/// required fields are present.
pub trait Endpoint: validator::Validate {
    /// Name used in logs, e.g. `indices.put_alias`.
    const NAME: &'static str;

    fn method(&self) -> Method;

    /// Path segments, not yet percent-encoded.
    fn path(&self) -> Vec<String>;

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![]
    }

    fn body(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        Ok(None)
    }
}

pub(crate) fn join(names: &[String]) -> String {
    names.join(",")
}

pub(crate) fn non_blank(names: &[String]) -> Result<(), validator::ValidationError> {
    names
        .iter()
        .try_for_each(|name| non_blank_name(name))
}

pub(crate) fn non_blank_name(name: &str) -> Result<(), validator::ValidationError> {
    if name.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank_name");
        err.message = Some("names must not be blank".into());
        return Err(err);
    }
    Ok(())
}
