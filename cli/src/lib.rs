#![allow(clippy::result_large_err)]

pub mod cli;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] osapi_client::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
