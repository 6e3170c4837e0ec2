//! Client code for swkit.
//!
//! This crate provides the request/response model the worker intercepts,
//! the HTTP network it falls through to, and the upstream clients used by
//! the relay (document store and push delivery).

pub mod docstore;
pub mod fetch;
pub mod push;

pub use docstore::{DocumentStoreClient, DocumentStoreConfig, DocumentStoreError, TokenDocument, TokenStore};
pub use fetch::{Body, HeaderMap, HeaderValue, HttpNetwork, Method, Network, NetworkConfig, Request, Response, StatusCode, header};
pub use push::{PushClient, PushConfig, PushDelivery, PushError, PushMessage, PushTarget};
