//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! Lookups already treat expired entries as absent; the sweep only bounds how
//! long they keep occupying memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;
use crate::codec::ValueCodec;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The sweep goes through the same lock as foreground calls, one pass per
/// interval.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Cache::new(CacheConfig::new(1000))?;
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<C: ValueCodec>(cache: Cache<C>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting TTL sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired();

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
