//! Backing Store Module
//!
//! The source of truth consulted by the gateway on a cache miss.

mod memory;
mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

// == Store Error ==
/// Failures talking to the backing store. A missing key is not an error.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The Redis client reported an error
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// The store answered, but not as expected
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The store cannot serve requests
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// == Backing Store ==
/// Read access to the key-value store behind the cache.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Fetches the value for `key`, returning `Ok(None)` when the store has none.
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, StoreError>;
}
