//! Hosted JSON document store client.
//!
//! Holds the push token registry: a single document shaped
//! `{ "tokens": [...] }`.
//!
//! ### Protocol
//!
//! - **Read**: `GET {base}/b/{id}/latest`
//! - **Write**: `PUT {base}/b/{id}` with the whole document as JSON
//! - **Authentication**: `X-Master-Key` header.
//! - Reads accept the bare document or one wrapped in `record`.

pub mod error;

pub use error::DocumentStoreError;

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "swkit/0.1";

/// The token registry document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDocument {
    #[serde(default)]
    pub tokens: Vec<String>,
}

impl TokenDocument {
    /// Append `token` unless an identical string is already present.
    ///
    /// Returns whether the document changed.
    pub fn add(&mut self, token: &str) -> bool {
        if self.tokens.iter().any(|t| t == token) {
            return false;
        }
        self.tokens.push(token.to_string());
        true
    }
}

/// Read/write access to the token registry document.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<TokenDocument, DocumentStoreError>;

    async fn save(&self, document: &TokenDocument) -> Result<(), DocumentStoreError>;
}

/// Document store client configuration.
#[derive(Debug, Clone)]
pub struct DocumentStoreConfig {
    /// Base URL (e.g. https://api.jsonbin.io/v3).
    pub base_url: String,
    pub document_id: String,
    pub api_key: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jsonbin.io/v3".to_string(),
            document_id: String::new(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentEnvelope {
    Wrapped { record: TokenDocument },
    Bare(TokenDocument),
}

/// Decode a read response body into the registry document.
pub fn parse_document(bytes: &[u8]) -> Result<TokenDocument, DocumentStoreError> {
    let envelope: DocumentEnvelope =
        serde_json::from_slice(bytes).map_err(|e| DocumentStoreError::Parse(e.to_string()))?;
    Ok(match envelope {
        DocumentEnvelope::Wrapped { record } => record,
        DocumentEnvelope::Bare(document) => document,
    })
}

/// reqwest-backed [`TokenStore`].
#[derive(Debug, Clone)]
pub struct DocumentStoreClient {
    http: reqwest::Client,
    config: Arc<DocumentStoreConfig>,
}

impl DocumentStoreClient {
    /// Create a new client with the given configuration.
    pub fn new(config: DocumentStoreConfig) -> Result<Self, DocumentStoreError> {
        if config.api_key.is_empty() {
            return Err(DocumentStoreError::MissingKey);
        }
        if config.document_id.is_empty() {
            return Err(DocumentStoreError::MissingDocument);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DocumentStoreError::Network(Arc::new(e)))?;

        Ok(Self { http, config: Arc::new(config) })
    }

    fn document_url(&self) -> String {
        format!("{}/b/{}", self.config.base_url.trim_end_matches('/'), self.config.document_id)
    }

    async fn read_body(response: reqwest::Response) -> Result<bytes::Bytes, DocumentStoreError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), detail, "document store rejected request");
            return Err(DocumentStoreError::HttpError { status: status.as_u16() });
        }
        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl TokenStore for DocumentStoreClient {
    async fn load(&self) -> Result<TokenDocument, DocumentStoreError> {
        let url = format!("{}/latest", self.document_url());
        tracing::debug!("loading token document from {}", url);

        let response = self
            .http
            .get(&url)
            .header("X-Master-Key", &self.config.api_key)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let bytes = Self::read_body(response).await?;
        parse_document(&bytes)
    }

    async fn save(&self, document: &TokenDocument) -> Result<(), DocumentStoreError> {
        let url = self.document_url();
        tracing::debug!(tokens = document.tokens.len(), "saving token document");

        let response = self
            .http
            .put(&url)
            .header("X-Master-Key", &self.config.api_key)
            .json(document)
            .send()
            .await?;

        Self::read_body(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_deduplicates_by_string_equality() {
        let mut doc = TokenDocument { tokens: vec!["abc".into()] };
        assert!(!doc.add("abc"));
        assert!(doc.add("ABC"));
        assert_eq!(doc.tokens, vec!["abc".to_string(), "ABC".to_string()]);
    }

    #[test]
    fn test_parse_bare_document() {
        let doc = parse_document(br#"{"tokens":["a","b"]}"#).unwrap();
        assert_eq!(doc.tokens, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_wrapped_document() {
        let doc = parse_document(br#"{"record":{"tokens":["a"]},"metadata":{"id":"x"}}"#).unwrap();
        assert_eq!(doc.tokens, vec!["a".to_string()]);
    }

    #[test]
    fn test_parse_missing_tokens_defaults_empty() {
        let doc = parse_document(b"{}").unwrap();
        assert!(doc.tokens.is_empty());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(parse_document(b"not json"), Err(DocumentStoreError::Parse(_))));
    }

    #[test]
    fn test_client_new_missing_key() {
        let config = DocumentStoreConfig { document_id: "doc".into(), ..Default::default() };
        assert!(matches!(DocumentStoreClient::new(config), Err(DocumentStoreError::MissingKey)));
    }

    #[test]
    fn test_client_new_missing_document() {
        let config = DocumentStoreConfig { api_key: "key".into(), ..Default::default() };
        assert!(matches!(DocumentStoreClient::new(config), Err(DocumentStoreError::MissingDocument)));
    }

    #[test]
    fn test_document_url() {
        let config = DocumentStoreConfig {
            base_url: "https://docs.test/v3/".into(),
            document_id: "abc123".into(),
            api_key: "key".into(),
            ..Default::default()
        };
        let client = DocumentStoreClient::new(config).unwrap();
        assert_eq!(client.document_url(), "https://docs.test/v3/b/abc123");
    }
}
