#![allow(clippy::result_large_err)]

//! Async client for the OpenSearch index and alias endpoints.
//!
//! Every successful call returns an [`ApiResponse`] holding the parsed body
//! and the raw exchange; every failed call that got as far as a response
//! keeps that response on the [`Error`]. Both sides are reachable through
//! [`Inspectable::inspect`].

mod alias;
pub mod config;
mod error;
mod indices;
mod inspect;
mod transport;

use std::sync::Arc;

use osapi_core::{Endpoint, InfoReq, InfoResp};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub use crate::{
    alias::Alias,
    config::Config,
    error::Error,
    indices::Indices,
    inspect::{ApiResponse, Inspect, Inspectable},
    transport::{RawResponse, Transport},
};
pub use osapi_core as core;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct Client {
    transport: Arc<Transport>,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(Transport::new(config)?),
        })
    }

    /// Builds a client from `osapi.toml` in `dir` (if present) and `OSAPI_*`
    /// environment variables.
    pub fn from_config_dir<S: AsRef<str>>(dir: Option<S>) -> Result<Self> {
        Self::new(&Config::load(dir)?)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn indices(&self) -> Indices<'_> {
        Indices::new(self)
    }

    pub fn alias(&self) -> Alias<'_> {
        Alias::new(self)
    }

    pub async fn info(
        &self,
        req: &InfoReq,
    ) -> Result<ApiResponse<InfoResp>> {
        self.send(req).await
    }

    /// Sends `endpoint` and decodes a 2xx body as `T`.
    pub(crate) async fn send<E, T>(
        &self,
        endpoint: &E,
    ) -> Result<ApiResponse<T>>
    where
        E: Endpoint,
        T: DeserializeOwned, {
        let raw = self.transport.perform(endpoint).await?;

        if !raw.status().is_success() {
            return Err(Error::api(raw));
        }

        let parsed = serde_json::from_slice::<T>(raw.body());
        match parsed {
            Ok(body) => Ok(ApiResponse::new(body, raw)),
            Err(source) => {
                tracing::trace!(
                    "failed to decode {} response: {}",
                    E::NAME,
                    source
                );
                Err(Error::Decode {
                    source,
                    response: Box::new(raw),
                })
            },
        }
    }

    /// Sends a HEAD style `endpoint`: any 2xx is `true`, 404 is `false`.
    pub(crate) async fn exists<E: Endpoint>(
        &self,
        endpoint: &E,
    ) -> Result<ApiResponse<bool>> {
        let raw = self.transport.perform(endpoint).await?;

        match raw.status() {
            status if status.is_success() => Ok(ApiResponse::new(true, raw)),
            StatusCode::NOT_FOUND => Ok(ApiResponse::new(false, raw)),
            _ => Err(Error::api(raw)),
        }
    }
}
