//! Shared TTL Cache
//!
//! Thread-safe handle over [`CacheStore`]. A single reader-writer lock guards
//! both the entries and the counters, so callers never need external locking.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

// == TTL Cache ==
/// Cloneable, concurrently usable bounded cache with a uniform TTL.
///
/// `stats` and `contains` take the read lock and may run concurrently with
/// each other. `get` takes the write lock because it updates counters,
/// recency and lazily drops expired entries.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Arc<RwLock<CacheStore<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries for `ttl` each.
    ///
    /// Fails with `InvalidArgument` when either is zero.
    pub fn new(max_size: usize, ttl: Duration) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(RwLock::new(CacheStore::new(max_size, ttl)?)),
        })
    }

    // == Set ==
    /// Stores `value` under `key` with a fresh TTL, evicting the least
    /// recently used entry if a new key arrives at capacity.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.inner.write().await.set(key.into(), value);
    }

    // == Get ==
    /// Returns the live value for `key`, counting a hit or a miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.write().await.get(key)
    }

    // == Delete ==
    /// Removes `key`. Returns whether an entry was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.write().await.delete(key)
    }

    // == Clear ==
    /// Removes every entry, keeping the hit and miss counters.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    // == Stats ==
    /// Snapshot of the counters with size recomputed from the live store.
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    // == Contains ==
    /// Returns true when `key` holds an unexpired entry, without counting.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.read().await.contains(key)
    }

    // == Purge Expired ==
    /// Drops every expired entry and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }
}
