//! Background Trim Task
//!
//! Runs the cache trimmer off the response path.

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{trim_cache, CacheStorage};

/// Spawns a task that trims store `name` down to `max_entries`.
///
/// The caller is not expected to await the handle; a response never waits
/// on cache bookkeeping. Aborting the task at any point leaves the store
/// valid, just possibly above its cap until the next trim.
///
/// # Returns
/// A JoinHandle resolving to the number of evicted entries.
pub fn spawn_trim_task(
    storage: CacheStorage,
    name: String,
    max_entries: usize,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let evicted = trim_cache(&storage, &name, max_entries).await;

        if evicted > 0 {
            info!("Trimmed {}: evicted {} entries", name, evicted);
        } else {
            debug!("Trim of {}: within cap of {}", name, max_entries);
        }
        evicted
    })
}
