//! Push-delivery API client.
//!
//! Sends a notification to one device token or a list of them through a
//! managed push service.
//!
//! ### Protocol
//!
//! - **Endpoint**: configurable, default `https://fcm.googleapis.com/fcm/send`
//! - **Authentication**: `Authorization: key=<server key>`
//! - **Targets**: `to` for one token, `registration_ids` for multicast.
//! - No retries; the upstream JSON response is handed back verbatim,
//!   including its per-token results for multicast sends.

pub mod error;

pub use error::PushError;

use async_trait::async_trait;
use reqwest::header;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Who a message goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTarget {
    Token(String),
    Multicast(Vec<String>),
}

impl PushTarget {
    pub fn is_empty(&self) -> bool {
        match self {
            PushTarget::Token(token) => token.is_empty(),
            PushTarget::Multicast(tokens) => tokens.iter().all(String::is_empty),
        }
    }
}

/// A notification to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct PushMessage {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Page opened when the notification is clicked.
    pub link: String,
    pub icon: String,
    pub badge: String,
    pub require_interaction: bool,
    pub target: PushTarget,
}

impl PushMessage {
    /// Wire representation sent upstream.
    ///
    /// `data` repeats title, body and url so the worker's push handler can
    /// read them straight from the payload.
    pub fn to_json(&self) -> Value {
        let mut message = json!({
            "notification": {
                "title": self.title,
                "body": self.body,
                "icon": self.icon,
                "click_action": self.link,
            },
            "webpush": {
                "fcm_options": { "link": self.link },
                "notification": {
                    "badge": self.badge,
                    "icon": self.icon,
                    "requireInteraction": self.require_interaction,
                },
            },
            "data": {
                "title": self.title,
                "body": self.body,
                "url": self.link,
            },
        });

        match &self.target {
            PushTarget::Token(token) => message["to"] = json!(token),
            PushTarget::Multicast(tokens) => message["registration_ids"] = json!(tokens),
        }

        message
    }
}

/// Delivery of a message through the push service.
#[async_trait]
pub trait PushDelivery: Send + Sync {
    /// Send the message, returning the upstream response body.
    async fn send(&self, message: &PushMessage) -> Result<Value, PushError>;
}

/// Push client configuration.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub endpoint: String,
    pub server_key: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
            server_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// reqwest-backed [`PushDelivery`].
#[derive(Debug, Clone)]
pub struct PushClient {
    http: reqwest::Client,
    config: Arc<PushConfig>,
}

impl PushClient {
    /// Create a new push client with the given configuration.
    pub fn new(config: PushConfig) -> Result<Self, PushError> {
        if config.server_key.is_empty() {
            return Err(PushError::MissingServerKey);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PushError::Network(Arc::new(e)))?;

        Ok(Self { http, config: Arc::new(config) })
    }
}

#[async_trait]
impl PushDelivery for PushClient {
    async fn send(&self, message: &PushMessage) -> Result<Value, PushError> {
        if message.target.is_empty() {
            return Err(PushError::NoTokens);
        }

        let recipients = match &message.target {
            PushTarget::Token(_) => 1,
            PushTarget::Multicast(tokens) => tokens.len(),
        };
        tracing::debug!(recipients, "sending push notification");

        let response = self
            .http
            .post(&self.config.endpoint)
            .header(header::AUTHORIZATION, format!("key={}", self.config.server_key))
            .json(&message.to_json())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("push service response status: {}", status);

        if status == 401 || status == 403 {
            return Err(PushError::AuthError);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(PushError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PushError::Parse(e.to_string()))
    }
}
