//! Cache Store Module
//!
//! Bounded, recency-ordered cache with lazy per-entry expiry, guarded by a single lock.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::cache::{CacheEntry, CacheStats, RecencyList};
use crate::error::{CacheError, Result};

// == Cache State ==
/// Recency list and key index, always mutated together under one lock.
#[derive(Debug)]
struct CacheState<K, V> {
    /// Fixed-length slot list, front = most recently used
    list: RecencyList<K, V>,
    /// Live keys and the slot each one occupies
    index: HashMap<K, usize>,
    /// Performance statistics
    stats: CacheStats,
}

// == Bounded Expiring Cache ==
/// Fixed-capacity LRU cache whose entries also expire a fixed duration after
/// their last `set`.
///
/// Expiry is lazy: it is only checked when a key is read, and an expired read
/// drops the key from the index while leaving its slot where it was. Eviction
/// picks the back slot purely by recency, regardless of expiry.
///
/// All operations take `&self`; share the cache across threads with `Arc`.
#[derive(Debug)]
pub struct BoundedExpiringCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    expiry: Duration,
    capacity: usize,
}

impl<K, V> BoundedExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache from raw configuration values.
    ///
    /// # Arguments
    /// * `expiry_ms` - Entry lifetime in milliseconds, 0 expires entries immediately
    /// * `capacity` - Number of slots, 0 retains nothing
    ///
    /// # Errors
    /// Returns `CacheError::InvalidConfiguration` if either value is negative.
    pub fn new(expiry_ms: i64, capacity: i64) -> Result<Self> {
        let (Ok(expiry), Ok(slots)) = (u64::try_from(expiry_ms), usize::try_from(capacity)) else {
            return Err(CacheError::InvalidConfiguration(format!(
                "negative cache expiry and capacity values unsupported (expiry={}ms, capacity={})",
                expiry_ms, capacity
            )));
        };

        Ok(Self::with_limits(Duration::from_millis(expiry), slots))
    }

    /// Creates a cache from already validated limits.
    ///
    /// All `capacity` slots are allocated up front.
    pub fn with_limits(expiry: Duration, capacity: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                list: RecencyList::with_slots(capacity),
                index: HashMap::with_capacity(capacity),
                stats: CacheStats::new(capacity),
            }),
            expiry,
            capacity,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, restarting its expiry timer.
    ///
    /// An existing key is updated in place and moved to the front. A new key
    /// takes over the back slot, evicting whatever it held.
    pub fn set(&self, key: K, value: V) {
        self.set_at(key, value, Instant::now());
    }

    fn set_at(&self, key: K, value: V, now: Instant) {
        let mut guard = self.state.lock();
        let CacheState { list, index, stats } = &mut *guard;

        if let Some(&idx) = index.get(&key) {
            list.replace(idx, CacheEntry::new(key, value, now));
            list.move_to_front(idx);
            return;
        }

        // Zero slots: the new entry is evicted as soon as it arrives
        let Some(idx) = list.back() else {
            return;
        };

        let displaced = list.replace(idx, CacheEntry::new(key.clone(), value, now));
        if let Some(old) = displaced {
            // A stale slot must not unlink a key that has since moved to another slot
            if index.get(&old.key) == Some(&idx) {
                index.remove(&old.key);
                stats.record_eviction();
            }
        }

        list.move_to_front(idx);
        index.insert(key, idx);
    }

    // == Get ==
    /// Returns a clone of the value for `key` if it is live.
    ///
    /// A hit moves the entry to the front. An expired entry is dropped from
    /// the index and reported as absent; its slot is left in place.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_at(key, Instant::now())
    }

    fn get_at<Q>(&self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut guard = self.state.lock();
        let CacheState { list, index, stats } = &mut *guard;

        let Some(&idx) = index.get(key) else {
            stats.record_miss();
            return None;
        };

        match list.entry(idx) {
            Some(entry) if !entry.is_expired_at(self.expiry, now) => {
                let value = entry.value.clone();
                list.move_to_front(idx);
                stats.record_hit();
                Some(value)
            }
            _ => {
                index.remove(key);
                stats.record_expiration();
                None
            }
        }
    }

    // == Clear ==
    /// Makes every entry absent by resetting the key index.
    ///
    /// Slots keep their stale contents and order; later `set` calls reclaim
    /// them from the back as usual.
    pub fn clear(&self) {
        self.state.lock().index = HashMap::with_capacity(self.capacity);
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let guard = self.state.lock();
        let mut stats = guard.stats.clone();
        stats.entries = guard.index.len();
        stats
    }

    // == Length ==
    /// Returns the number of keys currently in the index.
    ///
    /// Keys that expired but were not read since are still counted.
    pub fn len(&self) -> usize {
        self.state.lock().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }
}

#[cfg(test)]
impl<K, V> BoundedExpiringCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Keys physically held by each slot, front to back.
    fn slot_keys(&self) -> Vec<Option<K>> {
        self.state
            .lock()
            .list
            .iter()
            .map(|entry| entry.map(|e| e.key.clone()))
            .collect()
    }

    /// Panics if the list length or the index disagree with the slots.
    fn assert_consistent(&self) {
        let guard = self.state.lock();
        assert_eq!(guard.list.len(), self.capacity);
        assert!(guard.index.len() <= self.capacity);
        for (key, &idx) in &guard.index {
            let entry = guard.list.entry(idx).expect("indexed slot must be occupied");
            assert_eq!(&entry.key, key);
        }
    }
}
