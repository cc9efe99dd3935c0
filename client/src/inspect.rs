use std::ops::Deref;

use crate::RawResponse;

/// Raw view of a call result.
///
/// `response` is `None` only for failures that never produced a response:
/// validation, connection and configuration errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inspect<'a> {
    pub response: Option<&'a RawResponse>,
}

pub trait Inspectable {
    fn inspect(&self) -> Inspect<'_>;
}

/// Parsed body of a successful call, together with the raw response.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    body: T,
    response: RawResponse,
}

impl<T> ApiResponse<T> {
    pub fn new(
        body: T,
        response: RawResponse,
    ) -> Self {
        Self { body, response }
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn raw(&self) -> &RawResponse {
        &self.response
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub fn into_parts(self) -> (T, RawResponse) {
        (self.body, self.response)
    }
}

impl<T> Deref for ApiResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.body
    }
}

impl<T> Inspectable for ApiResponse<T> {
    fn inspect(&self) -> Inspect<'_> {
        Inspect {
            response: Some(&self.response),
        }
    }
}
