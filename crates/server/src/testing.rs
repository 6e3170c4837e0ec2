//! In-memory upstreams for relay tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::{Value, json};
use swkit_client::{DocumentStoreError, PushDelivery, PushError, PushMessage, PushTarget, TokenDocument, TokenStore};

#[derive(Debug, Default)]
pub struct FakeTokenStore {
    document: Mutex<TokenDocument>,
    saves: AtomicUsize,
    fail: bool,
}

impl FakeTokenStore {
    pub fn with_tokens(tokens: &[&str]) -> Self {
        let document = TokenDocument { tokens: tokens.iter().map(|t| t.to_string()).collect() };
        Self { document: Mutex::new(document), ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn tokens(&self) -> Vec<String> {
        self.document.lock().unwrap().tokens.clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for FakeTokenStore {
    async fn load(&self) -> Result<TokenDocument, DocumentStoreError> {
        if self.fail {
            return Err(DocumentStoreError::HttpError { status: 401 });
        }
        Ok(self.document.lock().unwrap().clone())
    }

    async fn save(&self, document: &TokenDocument) -> Result<(), DocumentStoreError> {
        *self.document.lock().unwrap() = document.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakePush {
    sent: Mutex<Vec<PushMessage>>,
    fail: bool,
}

impl FakePush {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDelivery for FakePush {
    async fn send(&self, message: &PushMessage) -> Result<Value, PushError> {
        if self.fail {
            return Err(PushError::HttpError { status: 500 });
        }
        self.sent.lock().unwrap().push(message.clone());

        let recipients = match &message.target {
            PushTarget::Token(_) => 1,
            PushTarget::Multicast(tokens) => tokens.len(),
        };
        Ok(json!({ "multicast_id": 1, "success": recipients, "failure": 0 }))
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
