//! Structured errors for the relay.
//!
//! Every error renders as `{ "success": false, "error": <message> }`.
//! Server-side failures log the upstream detail and answer with a generic
//! message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use swkit_client::{DocumentStoreError, PushError};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Registration without a usable token (or a body that did not parse).
    #[error("No token provided")]
    NoToken,

    /// Send request without any target token.
    #[error("No tokens provided")]
    NoTokens,

    /// Send request body that did not parse.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("token registry failed: {0}")]
    Registry(#[from] DocumentStoreError),

    #[error("push delivery failed: {0}")]
    Delivery(#[from] PushError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::NoToken | RelayError::NoTokens | RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Delivery(PushError::NoTokens) => StatusCode::BAD_REQUEST,
            RelayError::Registry(_) | RelayError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    fn public_message(&self) -> String {
        match self {
            RelayError::InvalidBody(_) => "Invalid request body".into(),
            RelayError::Registry(_) => "Failed to save token".into(),
            RelayError::Delivery(PushError::NoTokens) => RelayError::NoTokens.to_string(),
            RelayError::Delivery(_) => "Failed to send notification".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "rejected request: {}", self);
        }

        let body = json!({ "success": false, "error": self.public_message() });
        (status, Json(body)).into_response()
    }
}
