//! Push payload decoding.
//!
//! Payloads arrive in two shapes: a flat object produced by our own relay
//! (`{"title", "body", "url", "badge"}`) or a provider envelope with nested
//! `notification` and `data` objects. Top-level fields win over `data`,
//! which wins over `notification`. `message` is accepted for `body`.

use serde_json::{Map, Value};
use swkit_core::config::NotificationConfig;

/// Where the displayed content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSource {
    Parsed,
    /// Payload was absent, empty or not a JSON object.
    Default,
}

/// Resolved notification content for one push.
#[derive(Debug, Clone, PartialEq)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    pub icon: String,
    pub badge_icon: String,
    pub badge_count: u32,
    pub source: PayloadSource,
}

fn lookup<'a>(sources: &[&'a Map<String, Value>], names: &[&str]) -> Option<&'a Value> {
    sources
        .iter()
        .flat_map(|&source| names.iter().filter_map(move |name| source.get(*name)))
        .find(|value| !value.is_null())
}

fn text(sources: &[&Map<String, Value>], names: &[&str]) -> Option<String> {
    match lookup(sources, names)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Badge counts may be numbers or, from providers that stringify `data`, strings.
/// Zero is treated as absent.
fn count(sources: &[&Map<String, Value>]) -> Option<u32> {
    let n = match lookup(sources, &["badge", "badgeCount", "count"])? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (n > 0).then_some(n)
}

impl PushPayload {
    fn defaults(app_name: &str, config: &NotificationConfig) -> Self {
        Self {
            title: app_name.to_string(),
            body: config.default_body.clone(),
            url: "/".to_string(),
            icon: config.icon.clone(),
            badge_icon: config.badge_icon.clone(),
            badge_count: 1,
            source: PayloadSource::Default,
        }
    }

    /// Decode a push payload. Never fails: anything unusable yields the
    /// default notification.
    pub fn decode(data: Option<&[u8]>, app_name: &str, config: &NotificationConfig) -> Self {
        let Some(bytes) = data.filter(|b| !b.is_empty()) else {
            return Self::defaults(app_name, config);
        };

        let root = match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::warn!(kind = %json_kind(&other), "push payload is not an object, using defaults");
                return Self::defaults(app_name, config);
            }
            Err(e) => {
                tracing::warn!("malformed push payload, using defaults: {}", e);
                return Self::defaults(app_name, config);
            }
        };

        let mut sources = vec![&root];
        for nested in ["data", "notification"] {
            if let Some(Value::Object(map)) = root.get(nested) {
                sources.push(map);
            }
        }

        Self {
            title: text(&sources, &["title"]).unwrap_or_else(|| app_name.to_string()),
            body: text(&sources, &["body", "message"]).unwrap_or_default(),
            url: text(&sources, &["url", "link", "click_action"]).unwrap_or_else(|| "/".to_string()),
            icon: text(&sources, &["icon"]).unwrap_or_else(|| config.icon.clone()),
            badge_icon: config.badge_icon.clone(),
            badge_count: count(&sources).unwrap_or(1),
            source: PayloadSource::Parsed,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
