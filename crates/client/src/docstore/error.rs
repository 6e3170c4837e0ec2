//! Document store client error types.

use std::sync::Arc;

/// Errors from the hosted JSON document store.
#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    /// Missing access key.
    #[error("missing document store key")]
    MissingKey,

    /// Missing document identifier.
    #[error("missing document id")]
    MissingDocument,

    /// Upstream answered with a non-success status.
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

impl From<reqwest::Error> for DocumentStoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { DocumentStoreError::Timeout } else { DocumentStoreError::Network(Arc::new(err)) }
    }
}
