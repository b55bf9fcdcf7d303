//! Cache Store Module
//!
//! Cache engine combining HashMap storage with LRU tracking and TTL expiration.
//! Not synchronized on its own; see [`TtlCache`](super::TtlCache) for the
//! shared, lock-guarded handle.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};
use crate::error::{BatchError, Result};

// == Cache Store ==
/// Bounded cache storage with LRU eviction and a uniform TTL.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// TTL stamped on every write
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and TTL.
    ///
    /// Fails with `InvalidArgument` when either is zero.
    pub fn new(max_size: usize, ttl: Duration) -> Result<Self> {
        if max_size == 0 {
            return Err(BatchError::InvalidArgument(
                "cache max size must be positive".to_string(),
            ));
        }
        if ttl.is_zero() {
            return Err(BatchError::InvalidArgument(
                "cache ttl must be positive".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_size,
            ttl,
        })
    }

    // == Set ==
    /// Stores a value under `key`, resetting its expiry to now + ttl.
    ///
    /// If the key is new and the cache is at capacity, the least recently
    /// used entry is evicted first.
    pub fn set(&mut self, key: String, value: V) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(key = %evicted_key, "evicted least recently used cache entry");
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value, self.ttl));
        self.lru.touch(&key);
        self.stats.set_size(self.entries.len());
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_size(self.entries.len());
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_size(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Hit and miss counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_size(0);
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats;
        stats.set_size(self.entries.len());
        stats
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_size(self.entries.len());
        expired_keys.len()
    }

    /// Returns true when `key` holds an unexpired entry.
    ///
    /// Does not touch counters or recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Returns the number of stored entries, including not-yet-purged expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
