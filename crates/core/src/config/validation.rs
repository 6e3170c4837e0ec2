//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > 300_000 {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must not exceed 5 minutes (300000ms)".into() });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a timeout is less than 100ms or exceeds 5 minutes
    /// - `user_agent`, `app_name` or `worker.cache_version` is empty
    /// - `worker.scope` is not an absolute http(s) URL
    /// - `worker.api_prefix` does not start with `/`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }
        if self.app_name.is_empty() {
            return Err(ConfigError::Invalid { field: "app_name".into(), reason: "must not be empty".into() });
        }

        let worker = &self.worker;
        if worker.cache_version.is_empty() {
            return Err(ConfigError::Invalid {
                field: "worker.cache_version".into(),
                reason: "must not be empty".into(),
            });
        }

        match url::Url::parse(&worker.scope) {
            Ok(scope) if matches!(scope.scheme(), "http" | "https") => {}
            Ok(scope) => {
                return Err(ConfigError::Invalid {
                    field: "worker.scope".into(),
                    reason: format!("unsupported scheme: {}", scope.scheme()),
                });
            }
            Err(e) => return Err(ConfigError::Invalid { field: "worker.scope".into(), reason: e.to_string() }),
        }

        if !worker.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid { field: "worker.api_prefix".into(), reason: "must start with '/'".into() });
        }

        check_timeout("worker.network_timeout_ms", worker.network_timeout_ms)?;
        check_timeout("relay.timeout_ms", self.relay.timeout_ms)?;

        if !worker.precache.iter().any(|u| u == worker.fallback_url()) {
            tracing::warn!(
                fallback = worker.fallback_url(),
                "Fallback page is not part of the precache manifest; \
                 offline navigations will get the synthesized response"
            );
        }

        Ok(())
    }
}
