//! Push delivery client error types.

use std::sync::Arc;

/// Errors from the push-delivery API.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// Missing server key.
    #[error("missing push server key")]
    MissingServerKey,

    /// No device token to deliver to.
    #[error("no tokens provided")]
    NoTokens,

    /// Authentication failed (invalid server key).
    #[error("authentication failed: invalid server key")]
    AuthError,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PushError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { PushError::Timeout } else { PushError::Network(Arc::new(err)) }
    }
}
