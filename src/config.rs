//! Configuration Module
//!
//! Handles loading batch subsystem configuration from environment variables.

use std::env;
use std::time::Duration;

/// Batch subsystem configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the result cache can hold
    pub cache_max_size: usize,
    /// TTL in seconds applied to every cached result
    pub cache_ttl: u64,
    /// Maximum number of remote calls in flight at once
    pub max_concurrency: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BATCH_CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `BATCH_CACHE_TTL_SECS` - Cache TTL in seconds (default: 300)
    /// - `BATCH_MAX_CONCURRENCY` - Concurrent remote calls (default: 10)
    /// - `BATCH_CLEANUP_INTERVAL_SECS` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_max_size: env_or("BATCH_CACHE_MAX_SIZE", defaults.cache_max_size),
            cache_ttl: env_or("BATCH_CACHE_TTL_SECS", defaults.cache_ttl),
            max_concurrency: env_or("BATCH_MAX_CONCURRENCY", defaults.max_concurrency),
            cleanup_interval: env_or("BATCH_CLEANUP_INTERVAL_SECS", defaults.cleanup_interval),
        }
    }

    /// Cache TTL as a Duration.
    pub fn cache_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_max_size: 1000,
            cache_ttl: 300,
            max_concurrency: 10,
            cleanup_interval: 60,
        }
    }
}
