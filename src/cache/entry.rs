//! Cache Entry Module
//!
//! Defines the record held by each occupied slot of the recency list.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A cached key/value pair stamped with the time of its most recent `set`.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The lookup key, kept so an evicted slot can be unlinked from the index
    pub key: K,
    /// The cached payload, returned unchanged
    pub value: V,
    /// Monotonic time of the last `set` for this key
    pub inserted_at: Instant,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates an entry stamped with `inserted_at`.
    pub fn new(key: K, value: V, inserted_at: Instant) -> Self {
        Self {
            key,
            value,
            inserted_at,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `expiry` as of `now`.
    ///
    /// Boundary condition: the entry is live only while `now` is strictly
    /// before `inserted_at + expiry`, so an expiry of zero is always expired.
    pub fn is_expired_at(&self, expiry: Duration, now: Instant) -> bool {
        match self.inserted_at.checked_add(expiry) {
            Some(deadline) => now >= deadline,
            // Deadline beyond the clock's range never arrives
            None => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_fresh_is_live() {
        let now = Instant::now();
        let entry = CacheEntry::new("key", "value", now);

        assert!(!entry.is_expired_at(Duration::from_millis(100), now));
        assert!(!entry.is_expired_at(
            Duration::from_millis(100),
            now + Duration::from_millis(99)
        ));
    }

    #[test]
    fn test_entry_expires_at_deadline() {
        let now = Instant::now();
        let entry = CacheEntry::new("key", "value", now);

        assert!(entry.is_expired_at(
            Duration::from_millis(100),
            now + Duration::from_millis(100)
        ));
        assert!(entry.is_expired_at(Duration::from_millis(100), now + Duration::from_secs(5)));
    }

    #[test]
    fn test_zero_expiry_is_always_expired() {
        let now = Instant::now();
        let entry = CacheEntry::new("key", "value", now);

        assert!(entry.is_expired_at(Duration::ZERO, now));
    }

    #[test]
    fn test_huge_expiry_never_expires() {
        let now = Instant::now();
        let entry = CacheEntry::new("key", "value", now);

        assert!(!entry.is_expired_at(Duration::MAX, now + Duration::from_secs(3600)));
    }
}
