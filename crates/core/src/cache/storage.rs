//! Storage API consumed by the cache manager.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::hash::RequestKey;
use crate::Error;

/// Snapshot of a response as held in a named store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    /// Header pairs in arrival order; names may repeat.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
}

impl StoredResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self { status, headers, body, stored_at: chrono::Utc::now().to_rfc3339() }
    }

    /// First value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Async key-value blob store keyed by `(store name, request identity)`.
///
/// Writes are last-write-wins per key; there is no locking between
/// concurrent writers of the same key.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if it does not exist yet.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Look up a key in one store.
    async fn match_in(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Look up a key across all stores, oldest store first.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<StoredResponse>, Error>;

    /// Insert or overwrite an entry, creating the store on demand.
    async fn put(&self, name: &str, key: &RequestKey, response: &StoredResponse) -> Result<(), Error>;

    /// Delete a whole store. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Names of all existing stores, in creation order.
    async fn names(&self) -> Result<Vec<String>, Error>;
}
