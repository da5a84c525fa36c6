//! Redis Backend
//!
//! Backing store implementation on top of a multiplexed Redis connection.

use async_trait::async_trait;
use axum::body::Bytes;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::{BackingStore, StoreError};

// == Redis Backend ==
/// Reads values from Redis with plain `GET`.
///
/// The connection manager reconnects on its own and is cheap to clone, so
/// every fetch works on its own handle.
#[derive(Clone)]
pub struct RedisBackend {
    manager: ConnectionManager,
}

impl RedisBackend {
    // == Connect ==
    /// Opens a connection to `address` and checks it with `PING`.
    ///
    /// `address` may be a bare `host:port` or a full `redis://` URL.
    pub async fn connect(address: &str) -> Result<Self, StoreError> {
        let url = redis_url(address);
        let client = redis::Client::open(url.as_str())?;
        let mut manager = client.get_connection_manager().await?;

        let pong: String = redis::cmd("PING").query_async(&mut manager).await?;
        if pong != "PONG" {
            return Err(StoreError::UnexpectedReply(pong));
        }
        info!(url = %url, "Connected to redis");

        Ok(Self { manager })
    }
}

#[async_trait]
impl BackingStore for RedisBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut conn = self.manager.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        debug!(key = %key, found = value.is_some(), "redis GET");
        Ok(value.map(Bytes::from))
    }
}

/// Prefixes a bare `host:port` with the redis scheme.
fn redis_url(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("redis://{}/", address)
    }
}
