//! Relay router.
//!
//! Routes each endpoint to its implementation under `routes/` and shares
//! the upstream clients through [`RelayState`].

use std::sync::Arc;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;
use swkit_client::{PushDelivery, TokenStore};
use swkit_core::config::NotificationConfig;

use crate::error::RelayError;
use crate::routes::{save_token, send_notification};

/// Upstream clients and display settings shared by every request.
pub struct RelayState {
    pub tokens: Arc<dyn TokenStore>,
    pub push: Arc<dyn PushDelivery>,
    pub notifications: NotificationConfig,
}

/// Build the relay `Router`.
pub fn router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/saveToken", post(save_token::save_token_impl).fallback(method_not_allowed))
        .route(
            "/api/sendNotification",
            post(send_notification::send_impl).fallback(method_not_allowed),
        )
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    axum::Json(json!({ "ok": true }))
}

async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}
