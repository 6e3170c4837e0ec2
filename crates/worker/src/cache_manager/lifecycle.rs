//! Install and activate.

use std::time::Duration;

use swkit_client::Request;
use swkit_core::config::InstallPolicy;
use swkit_core::{Error, RequestKey, StoredResponse};
use url::Url;

use super::{CacheManager, fetch_with_timeout};
use crate::cancel::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    pub store: String,
    pub cached: Vec<Url>,
    /// Manifest entries skipped under the best-effort policy, with reasons.
    pub failed: Vec<(String, String)>,
    /// Activate without waiting for pages controlled by the previous version.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
    pub kept: Vec<String>,
    pub deleted: Vec<String>,
    /// Take control of pages opened before this version activated.
    pub claim_clients: bool,
}

impl CacheManager {
    /// Fetch the precache manifest into the static store.
    ///
    /// Every entry is fetched before anything is written, so under
    /// [`InstallPolicy::AllOrNothing`] a single failure leaves storage
    /// untouched.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        let store = self.config.static_cache();
        let timeout = self.config.network_timeout();
        let cancel = CancellationToken::new();
        tracing::info!(store = %store, entries = self.config.precache.len(), "installing precache");

        let mut fetched = Vec::with_capacity(self.config.precache.len());
        let mut failed = Vec::new();
        for raw in &self.config.precache {
            match self.precache_entry(raw, timeout, &cancel).await {
                Ok(entry) => fetched.push(entry),
                Err(reason) if self.config.install_policy == InstallPolicy::AllOrNothing => {
                    tracing::error!(url = %raw, "precache failed: {}", reason);
                    return Err(Error::PrecacheFailed { url: raw.clone(), reason });
                }
                Err(reason) => {
                    tracing::warn!(url = %raw, "skipping precache entry: {}", reason);
                    failed.push((raw.clone(), reason));
                }
            }
        }

        self.storage.open(&store).await?;
        let mut cached = Vec::with_capacity(fetched.len());
        for (url, key, stored) in fetched {
            self.storage
                .put(&store, &key, &stored)
                .await
                .map_err(|e| Error::PrecacheFailed { url: url.to_string(), reason: e.to_string() })?;
            cached.push(url);
        }

        tracing::info!(store = %store, cached = cached.len(), skipped = failed.len(), "precache complete");
        Ok(InstallReport { store, cached, failed, skip_waiting: true })
    }

    async fn precache_entry(
        &self, raw: &str, timeout: Duration, cancel: &CancellationToken,
    ) -> Result<(Url, RequestKey, StoredResponse), String> {
        let url = self.resolve(raw).map_err(|e| e.to_string())?;
        let request = Request::get(url.clone());
        let key = request.cache_key();

        let response = fetch_with_timeout(self.network.as_ref(), request, timeout, cancel)
            .await
            .map_err(|e| e.to_string())?;
        if !response.is_success() {
            return Err(format!("unexpected status {}", response.status()));
        }

        Ok((url, key, response.into_stored()))
    }

    /// Delete every store that is not one of this version's stores.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        let allowed = self.config.allowed_caches();
        let mut report = ActivateReport { kept: Vec::new(), deleted: Vec::new(), claim_clients: true };

        for name in self.storage.names().await? {
            if allowed.contains(&name) {
                report.kept.push(name);
            } else if self.storage.delete(&name).await? {
                tracing::info!(store = %name, "deleted outdated store");
                report.deleted.push(name);
            }
        }

        Ok(report)
    }
}
