//! Relay service settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Settings for the token registration and notification send endpoints.
///
/// Credentials have no defaults; they are checked only when the relay
/// starts, through the `require_*` accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub bind_addr: String,
    /// Base URL of the hosted JSON document service.
    pub document_store_url: String,
    /// Identifier of the document holding `{ "tokens": [...] }`.
    pub document_id: Option<String>,
    pub document_store_key: Option<String>,
    /// Push-delivery send endpoint.
    pub push_endpoint: String,
    pub push_server_key: Option<String>,
    pub timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            document_store_url: "https://api.jsonbin.io/v3".into(),
            document_id: None,
            document_store_key: None,
            push_endpoint: "https://fcm.googleapis.com/fcm/send".into(),
            push_server_key: None,
            timeout_ms: 10_000,
        }
    }
}

impl RelayConfig {
    /// Upstream request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the document id is not set.
    pub fn require_document_id(&self) -> Result<&str, ConfigError> {
        self.document_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "relay.document_id".into(),
            hint: "Set SWKIT_RELAY__DOCUMENT_ID environment variable".into(),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the document store key is not set.
    pub fn require_document_store_key(&self) -> Result<&str, ConfigError> {
        self.document_store_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "relay.document_store_key".into(),
            hint: "Set SWKIT_RELAY__DOCUMENT_STORE_KEY environment variable".into(),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the push server key is not set.
    pub fn require_push_server_key(&self) -> Result<&str, ConfigError> {
        self.push_server_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "relay.push_server_key".into(),
            hint: "Set SWKIT_RELAY__PUSH_SERVER_KEY environment variable".into(),
        })
    }
}
