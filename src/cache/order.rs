//! Insertion Order Module
//!
//! Tracks the order keys were written to a store, for FIFO eviction.

use std::collections::VecDeque;

use crate::cache::RequestKey;

// == Insertion Order ==
/// Tracks write order for FIFO eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Reads never reorder keys; only a write moves a key to the back.
#[derive(Debug, Default, Clone)]
pub struct InsertionOrder {
    order: VecDeque<RequestKey>,
}

impl InsertionOrder {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record Insert ==
    /// Marks a key as the newest insertion.
    ///
    /// A key already present is moved, so it appears exactly once.
    pub fn record_insert(&mut self, key: &RequestKey) {
        self.remove(key);
        self.order.push_back(key.clone());
    }

    pub fn remove(&mut self, key: &RequestKey) {
        self.order.retain(|k| k != key);
    }

    /// Returns the oldest key without removing it.
    pub fn oldest(&self) -> Option<&RequestKey> {
        self.order.front()
    }

    /// Keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &RequestKey> {
        self.order.iter()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn key(path: &str) -> RequestKey {
        RequestKey::from_url(&Url::parse("http://site").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_order_new() {
        let order = InsertionOrder::new();
        assert_eq!(order.oldest(), None);
        assert_eq!(order.iter().count(), 0);
    }

    #[test]
    fn test_first_insert_is_oldest() {
        let mut order = InsertionOrder::new();

        order.record_insert(&key("/a"));
        order.record_insert(&key("/b"));
        order.record_insert(&key("/c"));

        assert_eq!(order.iter().count(), 3);
        assert_eq!(order.oldest(), Some(&key("/a")));
    }

    #[test]
    fn test_reinsert_moves_to_newest() {
        let mut order = InsertionOrder::new();

        order.record_insert(&key("/a"));
        order.record_insert(&key("/b"));
        order.record_insert(&key("/a"));

        let keys: Vec<_> = order.iter().cloned().collect();
        assert_eq!(keys, vec![key("/b"), key("/a")]);
    }

    #[test]
    fn test_remove() {
        let mut order = InsertionOrder::new();

        order.record_insert(&key("/a"));
        order.record_insert(&key("/b"));
        order.remove(&key("/a"));
        order.remove(&key("/missing"));

        let keys: Vec<_> = order.iter().cloned().collect();
        assert_eq!(keys, vec![key("/b")]);
    }
}
