//! `POST /api/saveToken` implementation.
//!
//! Appends a device token to the registry document unless it is already
//! there. Registration is idempotent; an unchanged document is not written
//! back.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::handler::RelayState;

/// Request body for token registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveTokenParams {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveTokenOutput {
    pub success: bool,
    /// The full registry after the add.
    pub tokens: Vec<String>,
}

pub async fn save_token_impl(
    State(state): State<Arc<RelayState>>, body: Result<Json<SaveTokenParams>, JsonRejection>,
) -> Result<Json<SaveTokenOutput>, RelayError> {
    let Json(params) = body.map_err(|e| {
        tracing::debug!("unreadable registration body: {}", e);
        RelayError::NoToken
    })?;

    let token = params.token.as_deref().map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Err(RelayError::NoToken);
    }

    let mut document = state.tokens.load().await?;
    if document.add(token) {
        state.tokens.save(&document).await?;
        tracing::info!(registered = document.tokens.len(), "token registered");
    } else {
        tracing::debug!("token already registered");
    }

    Ok(Json(SaveTokenOutput { success: true, tokens: document.tokens }))
}
