//! Worker-side policy: store names, precache manifest, routing and
//! notification display.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which precached page answers an offline navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPage {
    /// Dedicated offline page (`offline_page_url`).
    #[default]
    OfflinePage,
    /// The app shell (`app_shell_url`).
    AppShell,
}

/// How the revalidate half of stale-while-revalidate relates to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// Return the stored response at once; the refresh runs as extended
    /// background work.
    #[default]
    Background,
    /// Return the stored response only after the refresh settled.
    Awaited,
}

/// Precache behaviour when part of the manifest cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallPolicy {
    #[default]
    AllOrNothing,
    BestEffort,
}

/// How a focused client is told to show a clicked notification's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickNavigation {
    /// Post `{ "action": "navigate", "url": ... }` to the page.
    #[default]
    PostMessage,
    /// Navigate the client directly.
    Navigate,
}

/// Immutable cache manager configuration.
///
/// Store names are derived from `cache_prefix` and `cache_version`; bumping
/// the version is what invalidates every previously cached response on the
/// next activation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Registration scope; relative URLs resolve against it.
    pub scope: String,
    pub cache_prefix: Option<String>,
    pub cache_version: String,
    /// URLs fetched and stored at install, in order.
    pub precache: Vec<String>,
    pub api_prefix: String,
    pub image_extensions: Vec<String>,
    /// Origins whose responses are treated as web fonts (cache-first).
    pub font_origins: Vec<String>,
    pub font_extensions: Vec<String>,
    /// Host fragments owned by a third-party push SDK; never intercepted.
    pub bypass_hosts: Vec<String>,
    /// Path fragments of third-party worker scripts; never intercepted.
    pub bypass_path_markers: Vec<String>,
    pub fallback_page: FallbackPage,
    pub app_shell_url: String,
    pub offline_page_url: String,
    /// Body of the synthesized 503 response.
    pub offline_message: String,
    pub refresh_mode: RefreshMode,
    pub install_policy: InstallPolicy,
    pub network_timeout_ms: u64,
}

const FONT_STYLESHEET: &str =
    "https://fonts.googleapis.com/css2?family=Tajawal:wght@300;400;500;700;800&display=swap";

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            scope: "http://localhost/".into(),
            cache_prefix: None,
            cache_version: "v1".into(),
            precache: vec![
                "/".into(),
                "/index.html".into(),
                "/manifest.json".into(),
                "/assets/splash-logo.png".into(),
                "/offline.html".into(),
                FONT_STYLESHEET.into(),
            ],
            api_prefix: "/api/".into(),
            image_extensions: ["png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico"]
                .into_iter()
                .map(String::from)
                .collect(),
            font_origins: vec!["https://fonts.googleapis.com".into(), "https://fonts.gstatic.com".into()],
            font_extensions: ["woff", "woff2", "ttf", "otf"].into_iter().map(String::from).collect(),
            bypass_hosts: vec!["onesignal.com".into()],
            bypass_path_markers: vec![
                "OneSignalSDKWorker".into(),
                "OneSignalSDKUpdaterWorker".into(),
                "OneSignalSDK".into(),
            ],
            fallback_page: FallbackPage::default(),
            app_shell_url: "/index.html".into(),
            offline_page_url: "/offline.html".into(),
            offline_message: "Offline: no network connection".into(),
            refresh_mode: RefreshMode::default(),
            install_policy: InstallPolicy::default(),
            network_timeout_ms: 5_000,
        }
    }
}

impl WorkerConfig {
    fn store_name(&self, kind: &str) -> String {
        match &self.cache_prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}-{kind}-{}", self.cache_version),
            _ => format!("{kind}-{}", self.cache_version),
        }
    }

    /// Store holding the precache manifest, fonts and general assets.
    pub fn static_cache(&self) -> String {
        self.store_name("static")
    }

    pub fn api_cache(&self) -> String {
        self.store_name("api")
    }

    pub fn image_cache(&self) -> String {
        self.store_name("images")
    }

    /// Store names that survive activation.
    pub fn allowed_caches(&self) -> [String; 3] {
        [self.static_cache(), self.api_cache(), self.image_cache()]
    }

    /// URL of the page served to offline navigations under the current policy.
    pub fn fallback_url(&self) -> &str {
        match self.fallback_page {
            FallbackPage::OfflinePage => &self.offline_page_url,
            FallbackPage::AppShell => &self.app_shell_url,
        }
    }

    /// Per-request network timeout.
    pub fn network_timeout(&self) -> Duration {
        Duration::from_millis(self.network_timeout_ms)
    }
}

/// Notification display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub icon: String,
    /// Monochrome icon shown in the status bar.
    pub badge_icon: String,
    pub default_body: String,
    pub click_navigation: ClickNavigation,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            icon: "/assets/splash-logo.png".into(),
            badge_icon: "/assets/splash-logo.png".into(),
            default_body: "You have a new notification".into(),
            click_navigation: ClickNavigation::default(),
        }
    }
}
