//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction, plus the
//! key scheme used to cache remote operation results.

mod entry;
mod key;
mod lru;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use entry::CacheEntry;
pub use key::{generate_key, Filters, EMPTY_FILTERS, KEY_SEPARATOR, UNSERIALIZABLE_FILTERS};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use ttl::TtlCache;
