//! Notification dispatcher: push display, badge update and click routing.

pub mod payload;

pub use payload::{PayloadSource, PushPayload};

use std::sync::Arc;

use serde_json::{Value, json};
use swkit_client::fetch::{resolve, within_scope};
use swkit_core::Error;
use swkit_core::config::{ClickNavigation, NotificationConfig};
use url::Url;

use crate::host::{Badging, Clients, NavigateMessage, Notification, NotificationSurface};

/// Result of the badge half of a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeUpdate {
    Set(u32),
    /// Host has no badging surface.
    Unsupported,
    /// Badging rejected the call; the notification was still shown.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushOutcome {
    pub notification: Notification,
    pub source: PayloadSource,
    pub badge: BadgeUpdate,
}

/// A click on a displayed notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationClick {
    pub notification_id: String,
    /// The `data` the notification was shown with.
    pub data: Value,
    /// Action button id, if a button rather than the body was clicked.
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// An existing window was focused and told to show `url`.
    Focused { client_id: String, url: Url },
    /// No window in scope was open; a new one was opened at `url`.
    Opened { url: Url },
}

pub struct NotificationDispatcher {
    app_name: String,
    config: Arc<NotificationConfig>,
    scope: Url,
    surface: Arc<dyn NotificationSurface>,
    badging: Option<Arc<dyn Badging>>,
    clients: Arc<dyn Clients>,
}

impl NotificationDispatcher {
    pub fn new(
        app_name: impl Into<String>, config: Arc<NotificationConfig>, scope: Url, surface: Arc<dyn NotificationSurface>,
        badging: Option<Arc<dyn Badging>>, clients: Arc<dyn Clients>,
    ) -> Self {
        Self { app_name: app_name.into(), config, scope, surface, badging, clients }
    }

    /// Display a notification for an incoming push and update the badge.
    ///
    /// Only a failure to show the notification is an error; badge problems
    /// are reported in the outcome.
    pub async fn on_push(&self, data: Option<&[u8]>) -> Result<PushOutcome, Error> {
        let payload = PushPayload::decode(data, &self.app_name, &self.config);
        let notification = Notification {
            title: payload.title,
            body: payload.body,
            icon: payload.icon,
            badge: payload.badge_icon,
            data: json!({ "url": payload.url }),
            require_interaction: false,
        };

        self.surface.show(&notification).await?;
        tracing::debug!(title = %notification.title, source = ?payload.source, "notification shown");

        let badge = match &self.badging {
            None => BadgeUpdate::Unsupported,
            Some(badging) => match badging.set_badge(payload.badge_count).await {
                Ok(()) => BadgeUpdate::Set(payload.badge_count),
                Err(e) => {
                    tracing::warn!("failed to set app badge: {}", e);
                    BadgeUpdate::Failed(e.to_string())
                }
            },
        };

        Ok(PushOutcome { notification, source: payload.source, badge })
    }

    /// Close the clicked notification and bring its target into view.
    pub async fn on_click(&self, click: NotificationClick) -> Result<ClickOutcome, Error> {
        if let Err(e) = self.surface.close(&click.notification_id).await {
            tracing::warn!(id = %click.notification_id, "failed to close notification: {}", e);
        }

        let target = self.target_url(&click.data);
        tracing::debug!(url = %target, action = ?click.action, "notification clicked");

        let clients = self.clients.match_all().await?;
        if let Some(client) = clients.iter().find(|c| within_scope(&c.url, &self.scope)) {
            match self.show_in(&client.id, &target).await {
                Ok(()) => return Ok(ClickOutcome::Focused { client_id: client.id.clone(), url: target }),
                Err(e) => tracing::warn!(client = %client.id, "could not reuse window, opening a new one: {}", e),
            }
        }

        self.clients.open_window(&target).await?;
        Ok(ClickOutcome::Opened { url: target })
    }

    async fn show_in(&self, client_id: &str, target: &Url) -> Result<(), Error> {
        self.clients.focus(client_id).await?;
        match self.config.click_navigation {
            ClickNavigation::PostMessage => {
                let message = serde_json::to_value(NavigateMessage::new(target.as_str()))?;
                self.clients.post_message(client_id, message).await
            }
            ClickNavigation::Navigate => self.clients.navigate(client_id, target).await,
        }
    }

    /// `data.url` resolved against the scope; the scope root when missing or
    /// unusable.
    fn target_url(&self, data: &Value) -> Url {
        let raw = data.get("url").and_then(Value::as_str).filter(|s| !s.is_empty()).unwrap_or("/");
        resolve(&self.scope, raw).unwrap_or_else(|e| {
            tracing::warn!(url = raw, "invalid notification target: {}", e);
            let mut root = self.scope.clone();
            root.set_path("/");
            root.set_query(None);
            root
        })
    }
}
