//! Cache Trimmer
//!
//! FIFO eviction for a bounded store.

use tracing::debug;

use crate::cache::CacheStorage;

// == Trim Cache ==
/// Evicts the oldest inserted entries of store `name` until it holds at most
/// `max_entries`, returning how many entries were removed.
///
/// Each pass re-reads the store size and oldest key and deletes a single
/// key, so writes that land while trimming are taken into account. Access
/// recency plays no part.
pub async fn trim_cache(storage: &CacheStorage, name: &str, max_entries: usize) -> usize {
    let mut evicted = 0;

    while storage.store_len(name).await > max_entries {
        let Some(oldest) = storage.oldest_key(name).await else {
            break;
        };
        if storage.delete_entry(name, &oldest).await {
            evicted += 1;
            storage.record(|stats| stats.record_eviction()).await;
            debug!(cache = name, key = %oldest, "evicted oldest entry");
        }
    }

    evicted
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{RequestKey, StoredResponse};
    use url::Url;

    fn key(i: usize) -> RequestKey {
        let url = Url::parse(&format!("http://site/notes/{i}.html")).unwrap();
        RequestKey::from_url(&url)
    }

    async fn fill(storage: &CacheStorage, count: usize) {
        for i in 0..count {
            let response = StoredResponse::new(key(i).as_str(), 200, format!("page {i}"));
            storage.put("runtime", key(i), response).await;
        }
    }

    #[tokio::test]
    async fn test_trim_under_cap_is_noop() {
        let storage = CacheStorage::new();
        fill(&storage, 5).await;

        assert_eq!(trim_cache(&storage, "runtime", 5).await, 0);
        assert_eq!(storage.store_len("runtime").await, 5);
    }

    #[tokio::test]
    async fn test_trim_evicts_oldest_first() {
        let storage = CacheStorage::new();
        fill(&storage, 8).await;

        let evicted = trim_cache(&storage, "runtime", 3).await;

        assert_eq!(evicted, 5);
        assert_eq!(storage.entry_keys("runtime").await, vec![key(5), key(6), key(7)]);
        assert_eq!(storage.stats().await.evictions, 5);
    }

    #[tokio::test]
    async fn test_trim_ignores_reads() {
        let storage = CacheStorage::new();
        fill(&storage, 3).await;

        // Reading the oldest entry must not save it
        let names = vec!["runtime".to_string()];
        storage.match_first(&names, &key(0)).await.unwrap();

        trim_cache(&storage, "runtime", 2).await;
        assert!(storage.match_in("runtime", &key(0)).await.is_none());
    }

    #[tokio::test]
    async fn test_trim_missing_store() {
        let storage = CacheStorage::new();
        assert_eq!(trim_cache(&storage, "nope", 0).await, 0);
    }

    #[tokio::test]
    async fn test_trim_to_zero_empties_store() {
        let storage = CacheStorage::new();
        fill(&storage, 4).await;

        assert_eq!(trim_cache(&storage, "runtime", 0).await, 4);
        assert_eq!(storage.store_len("runtime").await, 0);
    }
}
