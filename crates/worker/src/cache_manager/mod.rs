//! Cache manager: versioned precache, activation cleanup and fetch
//! interception over named stores.
//!
//! ### Stores
//! - `static-<version>`: precache manifest, fonts, everything unclassified
//! - `api-<version>`: responses under the API prefix
//! - `images-<version>`: responses with an image extension
//!
//! ### Strategies
//! - Fonts are cache-first.
//! - Everything else is stale-while-revalidate: the network fetch starts
//!   alongside the lookup, a hit answers at once and the refresh keeps
//!   running as extended work.
//! - Offline navigations get the precached fallback page; anything else
//!   gets a synthesized `503`.

mod intercept;
mod lifecycle;

pub use intercept::{FetchOutcome, ResponseSource};
pub use lifecycle::{ActivateReport, InstallReport};

use std::sync::Arc;
use std::time::Duration;

use swkit_client::fetch::resolve;
use swkit_client::{Network, Request, Response};
use swkit_core::config::WorkerConfig;
use swkit_core::{CacheStorage, Error, RequestKey, StoredResponse};
use url::Url;

use crate::cancel::CancellationToken;
use crate::classify::Classifier;

pub struct CacheManager {
    config: Arc<WorkerConfig>,
    scope: Url,
    classifier: Classifier,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
}

impl CacheManager {
    pub fn new(
        config: Arc<WorkerConfig>, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>,
    ) -> Result<Self, Error> {
        let scope = Url::parse(&config.scope).map_err(|e| Error::InvalidUrl(format!("{}: {}", config.scope, e)))?;
        let classifier = Classifier::new(config.clone());
        Ok(Self { config, scope, classifier, storage, network })
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Resolve a manifest or config URL against the scope.
    fn resolve(&self, raw: &str) -> Result<Url, Error> {
        resolve(&self.scope, raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))
    }

    /// Look a key up in `store`, the one refreshes write to, then across
    /// every store. Storage errors count as a miss.
    async fn lookup(&self, store: &str, key: &RequestKey) -> Option<StoredResponse> {
        match self.storage.match_in(store, key).await {
            Ok(Some(found)) => return Some(found),
            Ok(None) => {}
            Err(e) => tracing::warn!(store, url = %key.url, "cache lookup failed: {}", e),
        }

        match self.storage.match_any(key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(url = %key.url, "cache lookup failed: {}", e);
                None
            }
        }
    }
}

/// Everything a network refresh needs, owned so it can run as its own task.
struct Refresh {
    network: Arc<dyn Network>,
    storage: Arc<dyn CacheStorage>,
    store: String,
    key: RequestKey,
    request: Request,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Refresh {
    /// Fetch, and on a 2xx write a copy to the store. The response is
    /// returned whatever its status; a failed write is only logged.
    async fn run(self) -> Result<Response, Error> {
        let response = fetch_with_timeout(self.network.as_ref(), self.request, self.timeout, &self.cancel).await?;
        if !response.is_success() {
            tracing::debug!(url = %self.key.url, status = %response.status(), "not storing unsuccessful response");
            return Ok(response);
        }

        let (response, copy) = response.tee();
        match self.storage.put(&self.store, &self.key, &copy.into_stored()).await {
            Ok(()) => tracing::debug!(store = %self.store, url = %self.key.url, "stored response"),
            Err(e) => tracing::warn!(store = %self.store, url = %self.key.url, "failed to store response: {}", e),
        }
        Ok(response)
    }
}

/// Network fetch bounded by `timeout` and abandoned on cancellation.
pub(crate) async fn fetch_with_timeout(
    network: &dyn Network, request: Request, timeout: Duration, cancel: &CancellationToken,
) -> Result<Response, Error> {
    let url = request.url.to_string();
    if cancel.is_cancelled() {
        return Err(Error::Cancelled(url));
    }

    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled(url)),
        result = tokio::time::timeout(timeout, network.fetch(request)) => match result {
            Ok(response) => response,
            Err(_) => Err(Error::FetchTimeout(format!("{url} after {}ms", timeout.as_millis()))),
        },
    }
}
