//! Host surfaces the worker drives: notification display, app badging and
//! window clients.
//!
//! Each is a trait so the worker can run against a browser bridge, a native
//! shell or the in-memory fakes used in tests.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use swkit_core::Error;
use url::Url;

/// A notification to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Carried back on click; holds the target `url`.
    pub data: Value,
    pub require_interaction: bool,
}

#[async_trait]
pub trait NotificationSurface: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), Error>;

    async fn close(&self, notification_id: &str) -> Result<(), Error>;
}

/// App icon badge. Optional on the host: absent means unsupported.
#[async_trait]
pub trait Badging: Send + Sync {
    async fn set_badge(&self, count: u32) -> Result<(), Error>;
}

/// An open window controlled (or controllable) by the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowClient {
    pub id: String,
    pub url: Url,
    pub focused: bool,
}

/// Message posted to a page asking it to route to `url` itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigateMessage {
    pub action: &'static str,
    pub url: String,
}

impl NavigateMessage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { action: "navigate", url: url.into() }
    }
}

#[async_trait]
pub trait Clients: Send + Sync {
    /// All window clients, including ones not yet controlled.
    async fn match_all(&self) -> Result<Vec<WindowClient>, Error>;

    async fn focus(&self, client_id: &str) -> Result<(), Error>;

    async fn post_message(&self, client_id: &str, message: Value) -> Result<(), Error>;

    async fn navigate(&self, client_id: &str, url: &Url) -> Result<(), Error>;

    async fn open_window(&self, url: &Url) -> Result<(), Error>;

    /// Take control of every open page in scope.
    async fn claim(&self) -> Result<(), Error>;
}
