//! In-Memory Backend
//!
//! Backing store kept in process memory. The unit and HTTP test suites
//! use it in place of Redis.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::RwLock;

use super::{BackingStore, StoreError};

// == Memory Backend ==
/// A `HashMap` behind a `RwLock`, with a switch to simulate an outage.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    values: RwLock<HashMap<String, Bytes>>,
    unavailable: AtomicBool,
    fetches: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.values.write().await.insert(key.into(), value.into());
    }

    pub async fn remove(&self, key: &str) {
        self.values.write().await.remove(key);
    }

    /// Makes every subsequent fetch fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of fetches served so far, successful or not.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackingStore for MemoryBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory backend switched off".to_string()));
        }
        Ok(self.values.read().await.get(key).cloned())
    }
}
