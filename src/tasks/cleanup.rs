//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so that
//! results nobody asks for again do not hold capacity until evicted.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;

/// Spawns a background task that periodically purges expired cache entries.
///
/// The task loops forever, sleeping `interval` between runs. Each run takes
/// the cache's write lock once.
///
/// # Returns
/// A JoinHandle that can be used to abort the task on shutdown.
///
/// # Example
/// ```ignore
/// let cache: TtlCache<serde_json::Value> = TtlCache::new(1000, Duration::from_secs(300))?;
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: TtlCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "starting cache cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired().await;
            if removed > 0 {
                info!(removed, "cache cleanup removed expired entries");
            } else {
                debug!("cache cleanup found no expired entries");
            }
        }
    })
}
