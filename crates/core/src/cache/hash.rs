//! Request identity used as the cache key.

use sha2::{Digest, Sha256};

/// Compute the storage key for a request descriptor.
///
/// The method is uppercased; the URL is expected to be canonical already.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Normalized request descriptor (method + URL) and its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
    pub hash: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &str) -> Self {
        let method = method.to_ascii_uppercase();
        let hash = compute_cache_key(&method, url);
        Self { method, url: url.to_string(), hash }
    }

    /// Key of a plain GET for `url`.
    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }
}
