//! HTTP error types

use jobsync_core::StoreError;

/// Error type for HTTP operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The API answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<HttpError> for StoreError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { status, body } => StoreError::Remote { status, body },
            HttpError::InvalidJson(e) => StoreError::InvalidResponse(e.to_string()),
            HttpError::UnexpectedResponse(message) => StoreError::InvalidResponse(message),
            other => StoreError::Transport(other.to_string()),
        }
    }
}
