use std::io;

use thiserror::Error;

/// Failure of one playlist page fetch, reported after the internal retry.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request did not reach the server: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error Code: {status}\nMessage: {message}")]
    Server { status: u16, message: String },
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file: {0}")]
    Io(#[from] io::Error),
    #[error("stored value is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
