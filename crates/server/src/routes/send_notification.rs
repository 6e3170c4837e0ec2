//! `POST /api/sendNotification` implementation.
//!
//! Forwards a notification to one token or a list of tokens through the
//! push-delivery service. No retries; the upstream response is returned
//! verbatim.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swkit_client::{PushMessage, PushTarget};

use crate::error::RelayError;
use crate::handler::RelayState;

/// Request body for a send. `tokens` wins over `token` when both are given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Page to open on click (default: "/").
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tokens: Option<Vec<String>>,
    #[serde(default)]
    pub token: Option<String>,
}

impl SendParams {
    fn target(&self) -> Option<PushTarget> {
        let tokens: Vec<String> = self
            .tokens
            .iter()
            .flatten()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        if !tokens.is_empty() {
            return Some(PushTarget::Multicast(tokens));
        }

        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| PushTarget::Token(t.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutput {
    pub success: bool,
    /// Upstream response body, including per-token results.
    pub response: Value,
}

pub async fn send_impl(
    State(state): State<Arc<RelayState>>, body: Result<Json<SendParams>, JsonRejection>,
) -> Result<Json<SendOutput>, RelayError> {
    let Json(params) = body.map_err(|e| RelayError::InvalidBody(e.body_text()))?;
    let target = params.target().ok_or(RelayError::NoTokens)?;

    let link = params.url.filter(|u| !u.trim().is_empty()).unwrap_or_else(|| "/".to_string());
    let message = PushMessage {
        title: params.title,
        body: params.body,
        link,
        icon: state.notifications.icon.clone(),
        badge: state.notifications.badge_icon.clone(),
        require_interaction: true,
        target,
    };

    let response = state.push.send(&message).await?;
    tracing::info!(link = %message.link, "notification sent");

    Ok(Json(SendOutput { success: true, response }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use swkit_core::config::NotificationConfig;
    use tower::ServiceExt;

    use super::*;
    use crate::handler::router;
    use crate::testing::{FakePush, FakeTokenStore, read_json};

    fn app(push: Arc<FakePush>) -> axum::Router {
        router(Arc::new(RelayState {
            tokens: Arc::new(FakeTokenStore::default()),
            push,
            notifications: NotificationConfig::default(),
        }))
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/sendNotification")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_multicast_send_returns_upstream_response() {
        let push = Arc::new(FakePush::default());

        let response = app(push.clone())
            .oneshot(post(r#"{"title":"Sale","body":"50% off","url":"/promo","tokens":["a","b"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["response"]["success"], 2);

        let sent = push.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, PushTarget::Multicast(vec!["a".into(), "b".into()]));
        assert_eq!(sent[0].title.as_deref(), Some("Sale"));
        assert_eq!(sent[0].link, "/promo");
        assert_eq!(sent[0].icon, "/assets/splash-logo.png");
        assert!(sent[0].require_interaction);
    }

    #[tokio::test]
    async fn test_single_token_send_defaults_link() {
        let push = Arc::new(FakePush::default());

        let response = app(push.clone()).oneshot(post(r#"{"title":"Hi","token":"abc"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let sent = push.sent();
        assert_eq!(sent[0].target, PushTarget::Token("abc".into()));
        assert_eq!(sent[0].link, "/");
    }

    #[tokio::test]
    async fn test_missing_tokens_rejected() {
        for body in [r#"{"title":"Hi"}"#, r#"{"tokens":[]}"#, r#"{"tokens":[""],"token":" "}"#] {
            let push = Arc::new(FakePush::default());
            let response = app(push.clone()).oneshot(post(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(read_json(response).await, json!({ "success": false, "error": "No tokens provided" }));
            assert!(push.sent().is_empty());
        }
    }

    #[tokio::test]
    async fn test_unparsable_body_rejected() {
        let response = app(Arc::new(FakePush::default())).oneshot(post("[1,2")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["error"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generic_500() {
        let response = app(Arc::new(FakePush::failing())).oneshot(post(r#"{"token":"abc"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await, json!({ "success": false, "error": "Failed to send notification" }));
    }

    #[test]
    fn test_tokens_win_over_token() {
        let params = SendParams {
            tokens: Some(vec!["a".into()]),
            token: Some("b".into()),
            ..Default::default()
        };
        assert_eq!(params.target(), Some(PushTarget::Multicast(vec!["a".into()])));
    }
}
