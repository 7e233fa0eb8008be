//! Cache Store Module
//!
//! A single named store: HashMap storage with insertion-order tracking.

use std::collections::HashMap;

use crate::cache::{InsertionOrder, RequestKey, StoredResponse};

// == Cache Store ==
/// One named key-value store of response snapshots.
#[derive(Debug, Default, Clone)]
pub struct CacheStore {
    entries: HashMap<RequestKey, StoredResponse>,
    order: InsertionOrder,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    // == Put ==
    /// Stores a response under `key`.
    ///
    /// An existing entry is replaced and its key becomes the newest insertion.
    pub fn put(&mut self, key: RequestKey, response: StoredResponse) {
        self.order.record_insert(&key);
        self.entries.insert(key, response);
    }

    // == Get ==
    /// Returns a copy of the stored response. Lookups do not affect eviction order.
    pub fn get(&self, key: &RequestKey) -> Option<StoredResponse> {
        self.entries.get(key).cloned()
    }

    // == Delete ==
    /// Removes an entry, returning whether it existed.
    pub fn delete(&mut self, key: &RequestKey) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Keys ==
    /// All keys from oldest to newest insertion.
    pub fn keys(&self) -> Vec<RequestKey> {
        self.order.iter().cloned().collect()
    }

    /// Oldest inserted key, the next eviction candidate.
    pub fn oldest(&self) -> Option<&RequestKey> {
        self.order.oldest()
    }

    pub fn contains(&self, key: &RequestKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
