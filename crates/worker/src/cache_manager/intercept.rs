//! Fetch interception.

use swkit_client::{Request, Response};
use swkit_core::Error;
use swkit_core::config::RefreshMode;

use super::{CacheManager, Refresh};
use crate::cancel::CancellationToken;
use crate::classify::RequestClass;
use crate::tasks::WaitUntil;

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Precached fallback page for an offline navigation.
    Fallback,
    /// Synthesized `503`.
    Offline,
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// Not intercepted; the host performs its default network fetch.
    Passthrough(Request),
    Respond { response: Response, source: ResponseSource },
}

impl FetchOutcome {
    fn respond(response: Response, source: ResponseSource) -> Self {
        FetchOutcome::Respond { response, source }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchOutcome::Passthrough(_) => None,
            FetchOutcome::Respond { source, .. } => Some(*source),
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            FetchOutcome::Passthrough(_) => None,
            FetchOutcome::Respond { response, .. } => Some(response),
        }
    }
}

impl CacheManager {
    /// Answer an intercepted request.
    ///
    /// Never fails: network and storage problems end in a cached, fallback or
    /// synthesized response. Background refreshes are registered on
    /// `wait_until`.
    pub async fn handle_fetch(
        &self, request: Request, cancel: &CancellationToken, wait_until: &WaitUntil,
    ) -> FetchOutcome {
        let class = self.classifier.classify(&request.url);
        let Some(store) = class.store(&self.config) else {
            tracing::trace!(url = %request.url, "bypassing third-party request");
            return FetchOutcome::Passthrough(request);
        };

        if !request.is_get() {
            return FetchOutcome::Passthrough(request);
        }

        tracing::debug!(url = %request.url, ?class, store = %store, "intercepting");
        match class {
            RequestClass::Font => self.cache_first(request, store, cancel).await,
            _ => self.stale_while_revalidate(request, store, cancel, wait_until).await,
        }
    }

    fn refresh(&self, request: Request, store: String, cancel: CancellationToken) -> Refresh {
        Refresh {
            network: self.network.clone(),
            storage: self.storage.clone(),
            store,
            key: request.cache_key(),
            request,
            timeout: self.config.network_timeout(),
            cancel,
        }
    }

    async fn stale_while_revalidate(
        &self, request: Request, store: String, cancel: &CancellationToken, wait_until: &WaitUntil,
    ) -> FetchOutcome {
        let key = request.cache_key();
        let navigation = request.accepts_html();

        // Started before the lookup so a miss does not pay for both in sequence.
        let refresh = tokio::spawn(self.refresh(request, store.clone(), cancel.clone()).run());

        let Some(stored) = self.lookup(&store, &key).await else {
            return match refresh.await {
                Ok(Ok(response)) => FetchOutcome::respond(response, ResponseSource::Network),
                Ok(Err(e)) => {
                    log_fetch_failure(&key.url, "cache miss", &e);
                    self.offline(navigation).await
                }
                Err(e) => {
                    tracing::warn!(url = %key.url, "fetch task failed: {}", e);
                    self.offline(navigation).await
                }
            };
        };

        let label = format!("revalidate {}", key.url);
        let url = key.url;
        let settle = async move {
            match refresh.await {
                Ok(Ok(response)) => tracing::debug!(url = %url, status = %response.status(), "revalidated"),
                Ok(Err(e)) => log_fetch_failure(&url, "revalidation", &e),
                Err(e) => tracing::warn!(url = %url, "revalidation task failed: {}", e),
            }
        };

        match self.config.refresh_mode {
            RefreshMode::Background => wait_until.extend(label, settle),
            RefreshMode::Awaited => settle.await,
        }

        FetchOutcome::respond(Response::from_stored(stored), ResponseSource::Cache)
    }

    async fn cache_first(&self, request: Request, store: String, cancel: &CancellationToken) -> FetchOutcome {
        let key = request.cache_key();
        if let Some(stored) = self.lookup(&store, &key).await {
            return FetchOutcome::respond(Response::from_stored(stored), ResponseSource::Cache);
        }

        let navigation = request.accepts_html();
        match self.refresh(request, store, cancel.clone()).run().await {
            Ok(response) => FetchOutcome::respond(response, ResponseSource::Network),
            Err(e) => {
                log_fetch_failure(&key.url, "cache-first miss", &e);
                self.offline(navigation).await
            }
        }
    }

    /// Fallback page for navigations when it is stored, otherwise a `503`.
    async fn offline(&self, navigation: bool) -> FetchOutcome {
        if navigation {
            match self.resolve(self.config.fallback_url()) {
                Ok(url) => {
                    let store = self.config.static_cache();
                    if let Some(stored) = self.lookup(&store, &Request::get(url).cache_key()).await {
                        return FetchOutcome::respond(Response::from_stored(stored), ResponseSource::Fallback);
                    }
                    tracing::warn!(page = %self.config.fallback_url(), "fallback page is not cached");
                }
                Err(e) => tracing::warn!("invalid fallback page: {}", e),
            }
        }

        FetchOutcome::respond(Response::offline(&self.config.offline_message), ResponseSource::Offline)
    }
}

/// Offline and timeout are expected here; anything else is worth a warning.
fn log_fetch_failure(url: &str, during: &str, err: &Error) {
    if err.is_network_failure() {
        tracing::debug!(url, "network failed on {}: {}", during, err);
    } else {
        tracing::warn!(url, "fetch failed on {}: {}", during, err);
    }
}
