//! Cache Proxy - A read-through cache in front of Redis
//!
//! Shields the backing store from repeated lookups of the same key with a
//! bounded LRU cache whose entries expire a fixed time after they are set.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::BoundedExpiringCache;
pub use config::Config;
