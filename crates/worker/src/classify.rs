//! Request classification and store routing.
//!
//! Classification is a pure function of URL shape: host, origin, path
//! prefix and file extension. Precedence is bypass, font, image, api,
//! static.

use std::sync::Arc;

use swkit_core::config::WorkerConfig;
use url::Url;

/// What kind of resource a request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    Static,
    Api,
    Image,
    Font,
    /// Owned by a third-party push SDK; never intercepted.
    Bypass,
}

impl RequestClass {
    /// Store a successful response of this class is written to.
    pub fn store(self, config: &WorkerConfig) -> Option<String> {
        match self {
            RequestClass::Image => Some(config.image_cache()),
            RequestClass::Api => Some(config.api_cache()),
            RequestClass::Static | RequestClass::Font => Some(config.static_cache()),
            RequestClass::Bypass => None,
        }
    }
}

fn extension(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Classifies URLs under one worker configuration.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: Arc<WorkerConfig>,
}

impl Classifier {
    pub fn new(config: Arc<WorkerConfig>) -> Self {
        Self { config }
    }

    pub fn classify(&self, url: &Url) -> RequestClass {
        if self.is_bypassed(url) {
            return RequestClass::Bypass;
        }

        let ext = extension(url);
        let has_ext = |list: &[String]| ext.as_deref().is_some_and(|e| list.iter().any(|x| x.eq_ignore_ascii_case(e)));

        let origin = url.origin().ascii_serialization();
        if self.config.font_origins.iter().any(|o| o.trim_end_matches('/') == origin)
            || has_ext(&self.config.font_extensions)
        {
            return RequestClass::Font;
        }

        if has_ext(&self.config.image_extensions) {
            return RequestClass::Image;
        }

        if url.path().starts_with(&self.config.api_prefix) {
            return RequestClass::Api;
        }

        RequestClass::Static
    }

    fn is_bypassed(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        let path = url.path();

        self.config
            .bypass_hosts
            .iter()
            .any(|h| !h.is_empty() && host.contains(&h.to_ascii_lowercase()))
            || self
                .config
                .bypass_path_markers
                .iter()
                .any(|m| !m.is_empty() && path.contains(m.as_str()))
    }
}
