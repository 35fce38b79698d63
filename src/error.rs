//! Error handling and custom error types
//!
//! One error enum covers both sides of the wire: the proxy maps variants to
//! sanitized HTTP responses, the client surfaces them to its caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream model returned status {status}")]
    UpstreamStatus { status: u16 },

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Upstream model returned no content")]
    EmptyCompletion,

    #[error("Failed to parse analysis: {0}")]
    Parse(String),

    #[error("Analysis timed out. Please try again.")]
    Timeout,

    #[error("Analysis was cancelled")]
    Cancelled,

    /// Non-OK status from the analysis proxy.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// HTTP 200 carrying `success: false`.
    #[error("{0}")]
    ApplicationFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}
