//! Unified error types for swkit.

use tokio_rusqlite::rusqlite;

/// Unified error types for the offline worker and its relay.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input, such as stored headers that no longer decode.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A precache entry could not be fetched or stored during install.
    #[error("PRECACHE_FAILED: {url}: {reason}")]
    PrecacheFailed { url: String, reason: String },

    /// Network fetch exceeded the per-request timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch was cancelled before it settled.
    #[error("FETCH_CANCELLED: {0}")]
    Cancelled(String),

    /// Network or HTTP level failure.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// A host surface (notifications, badging, clients) rejected a call.
    #[error("HOST_ERROR: {0}")]
    Host(String),
}

impl Error {
    /// Whether this error means the network could not produce a response.
    ///
    /// These are the failures interception recovers from with a cached or
    /// synthesized response.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::FetchTimeout(_) | Error::Cancelled(_) | Error::HttpError(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(format!("malformed JSON: {err}"))
    }
}
