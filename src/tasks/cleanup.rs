//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of the item
//! cache. Lookups already ignore expired entries; the sweep only bounds how
//! long dead entries occupy memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that removes expired cache entries every
/// `cleanup_interval_secs` seconds and logs cache statistics.
///
/// Abort the returned handle during shutdown.
pub fn spawn_cleanup_task(cache: Cache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired();
            let stats = cache.stats();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            }
            debug!(
                hits = stats.hits,
                misses = stats.misses,
                hit_rate = stats.hit_rate(),
                expirations = stats.expirations,
                evictions = stats.evictions,
                entries = stats.entries,
                "cache stats"
            );
        }
    })
}
