//! Cache Storage Module
//!
//! The host-side cache service: a set of named stores shared by every
//! worker version through a cloneable handle.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore, RequestKey, StoredResponse};

#[derive(Debug, Default)]
struct StorageInner {
    /// Store names in creation order
    names: Vec<String>,
    stores: HashMap<String, CacheStore>,
    stats: CacheStats,
}

impl StorageInner {
    fn open(&mut self, name: &str) -> &mut CacheStore {
        if !self.stores.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.stores.entry(name.to_string()).or_default()
    }
}

// == Cache Storage ==
/// Handle to the named cache stores.
///
/// Clones share the same stores. Every method takes the lock once, so each
/// call is atomic with respect to every other call.
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    inner: Arc<RwLock<StorageInner>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds storage from stores listed in creation order.
    pub fn from_stores(stores: Vec<(String, CacheStore)>) -> Self {
        let mut inner = StorageInner::default();
        for (name, store) in stores {
            *inner.open(&name) = store;
        }
        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Copies every store, in creation order.
    pub async fn export(&self) -> Vec<(String, CacheStore)> {
        let inner = self.inner.read().await;
        inner
            .names
            .iter()
            .filter_map(|name| inner.stores.get(name).map(|s| (name.clone(), s.clone())))
            .collect()
    }

    // == Named Stores ==
    /// Creates the store `name` if it does not exist yet.
    pub async fn open(&self, name: &str) {
        self.inner.write().await.open(name);
    }

    pub async fn has(&self, name: &str) -> bool {
        self.inner.read().await.stores.contains_key(name)
    }

    /// Store names in creation order.
    pub async fn names(&self) -> Vec<String> {
        self.inner.read().await.names.clone()
    }

    /// Drops a whole store, returning whether it existed.
    pub async fn delete_store(&self, name: &str) -> bool {
        let mut inner = self.inner.write().await;
        inner.names.retain(|n| n != name);
        inner.stores.remove(name).is_some()
    }

    // == Entries ==
    /// Writes one entry, creating the store on first use.
    pub async fn put(&self, name: &str, key: RequestKey, response: StoredResponse) {
        self.inner.write().await.open(name).put(key, response);
    }

    /// Writes a batch of entries under one lock; no other call can observe
    /// a partially written batch.
    pub async fn put_all(&self, name: &str, entries: Vec<(RequestKey, StoredResponse)>) {
        let mut inner = self.inner.write().await;
        let store = inner.open(name);
        for (key, response) in entries {
            store.put(key, response);
        }
    }

    /// Looks `key` up in one store.
    pub async fn match_in(&self, name: &str, key: &RequestKey) -> Option<StoredResponse> {
        self.inner.read().await.stores.get(name)?.get(key)
    }

    // == Match First ==
    /// Looks `key` up in each listed store in turn and returns the first hit.
    ///
    /// Records a hit or a miss in the storage statistics.
    pub async fn match_first(&self, names: &[String], key: &RequestKey) -> Option<StoredResponse> {
        let mut inner = self.inner.write().await;
        let found = names
            .iter()
            .filter_map(|name| inner.stores.get(name))
            .find_map(|store| store.get(key));

        match found {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        found
    }

    /// Keys of store `name` from oldest to newest; empty if the store is missing.
    pub async fn entry_keys(&self, name: &str) -> Vec<RequestKey> {
        self.inner
            .read()
            .await
            .stores
            .get(name)
            .map(CacheStore::keys)
            .unwrap_or_default()
    }

    /// Oldest inserted key of store `name`, the next eviction candidate.
    pub async fn oldest_key(&self, name: &str) -> Option<RequestKey> {
        self.inner.read().await.stores.get(name)?.oldest().cloned()
    }

    /// Whether store `name` exists and holds an entry for every key.
    pub async fn holds_all(&self, name: &str, keys: &[RequestKey]) -> bool {
        match self.inner.read().await.stores.get(name) {
            Some(store) => keys.iter().all(|key| store.contains(key)),
            None => false,
        }
    }

    pub async fn delete_entry(&self, name: &str, key: &RequestKey) -> bool {
        self.inner
            .write()
            .await
            .stores
            .get_mut(name)
            .map(|store| store.delete(key))
            .unwrap_or(false)
    }

    pub async fn store_len(&self, name: &str) -> usize {
        self.inner
            .read()
            .await
            .stores
            .get(name)
            .map(CacheStore::len)
            .unwrap_or(0)
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats.clone()
    }

    /// Applies `update` to the shared statistics.
    pub async fn record<F>(&self, update: F)
    where
        F: FnOnce(&mut CacheStats),
    {
        update(&mut self.inner.write().await.stats);
    }
}
