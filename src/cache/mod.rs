//! Cache Module
//!
//! Provides the bounded, time-aware LRU cache that fronts the backing store.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::RecencyList;
pub use stats::CacheStats;
pub use store::BoundedExpiringCache;
