//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWKIT_*, nested keys joined with `__`)
//! 2. TOML config file (if SWKIT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod relay;
mod validation;
mod worker;

pub use relay::RelayConfig;
pub use validation::ConfigError;
pub use worker::{ClickNavigation, FallbackPage, InstallPolicy, NotificationConfig, RefreshMode, WorkerConfig};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWKIT_*)
/// 2. TOML config file (if SWKIT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name, used as the default notification title.
    ///
    /// Set via SWKIT_APP_NAME environment variable.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Path to the SQLite database backing the named cache stores.
    ///
    /// Set via SWKIT_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for outgoing HTTP requests.
    ///
    /// Set via SWKIT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Cache manager policy (SWKIT_WORKER__*).
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Notification display settings (SWKIT_NOTIFICATIONS__*).
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Relay endpoints and upstream credentials (SWKIT_RELAY__*).
    #[serde(default)]
    pub relay: RelayConfig,
}

fn default_app_name() -> String {
    "swkit".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swkit-cache.sqlite")
}

fn default_user_agent() -> String {
    "swkit/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            worker: WorkerConfig::default(),
            notifications: NotificationConfig::default(),
            relay: RelayConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWKIT_`
    /// 2. TOML file from `SWKIT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWKIT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWKIT_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.app_name, "swkit");
        assert_eq!(config.db_path, PathBuf::from("./swkit-cache.sqlite"));
        assert_eq!(config.user_agent, "swkit/0.1");
        assert_eq!(config.worker.cache_version, "v1");
        assert_eq!(config.worker.refresh_mode, RefreshMode::Background);
        assert_eq!(config.worker.install_policy, InstallPolicy::AllOrNothing);
        assert!(config.relay.document_store_key.is_none());
    }

    #[test]
    fn test_load_env_overrides_nested() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SWKIT_APP_NAME", "ZOONA");
            jail.set_env("SWKIT_WORKER__CACHE_VERSION", "v2");
            jail.set_env("SWKIT_WORKER__REFRESH_MODE", "awaited");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.app_name, "ZOONA");
            assert_eq!(config.worker.cache_version, "v2");
            assert_eq!(config.worker.refresh_mode, RefreshMode::Awaited);
            assert_eq!(config.worker.static_cache(), "static-v2");
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "swkit.toml",
                r#"
                app_name = "Store"

                [worker]
                cache_prefix = "zoona"
                fallback_page = "app_shell"

                [relay]
                bind_addr = "0.0.0.0:8080"
                "#,
            )?;
            jail.set_env("SWKIT_CONFIG_FILE", "swkit.toml");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.app_name, "Store");
            assert_eq!(config.worker.fallback_page, FallbackPage::AppShell);
            assert_eq!(config.worker.api_cache(), "zoona-api-v1");
            assert_eq!(config.relay.bind_addr, "0.0.0.0:8080");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SWKIT_WORKER__NETWORK_TIMEOUT_MS", "10");

            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "worker.network_timeout_ms"));
            Ok(())
        });
    }
}
