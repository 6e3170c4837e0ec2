//! Named cache stores backed by SQLite.
//!
//! This module provides the blob store the worker caches responses in:
//! a set of named stores, each a key-value map from a normalized request
//! identity to a stored response snapshot. It supports:
//!
//! - Stable request keys using SHA-256 hashing
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-store deletion for version cleanup

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod storage;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::RequestKey;
pub use storage::{CacheStorage, StoredResponse};
