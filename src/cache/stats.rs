//! Cache Statistics Module
//!
//! Tracks how requests were served: cache hits, misses, network fetches,
//! runtime writes, evictions and offline fallbacks.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from a store
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Network attempts made by the strategies
    pub network_fetches: u64,
    /// Responses written to the runtime store
    pub runtime_writes: u64,
    /// Entries removed by the trimmer
    pub evictions: u64,
    /// Times the offline page stood in for a document
    pub offline_fallbacks: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_network_fetch(&mut self) {
        self.network_fetches += 1;
    }

    pub fn record_runtime_write(&mut self) {
        self.runtime_writes += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_offline_fallback(&mut self) {
        self.offline_fallbacks += 1;
    }
}
