//! Response DTOs for the worker admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::worker::WorkerState;

/// Response body for the stats endpoint (GET /__worker/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Controlling version, if any
    pub version: Option<String>,
    /// Store names in creation order
    pub caches: Vec<String>,
    pub core_entries: usize,
    pub runtime_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub network_fetches: u64,
    pub runtime_writes: u64,
    pub evictions: u64,
    pub offline_fallbacks: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(
        version: Option<String>,
        caches: Vec<String>,
        core_entries: usize,
        runtime_entries: usize,
        stats: &CacheStats,
    ) -> Self {
        Self {
            version,
            caches,
            core_entries,
            runtime_entries,
            hits: stats.hits,
            misses: stats.misses,
            network_fetches: stats.network_fetches,
            runtime_writes: stats.runtime_writes,
            evictions: stats.evictions,
            offline_fallbacks: stats.offline_fallbacks,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the health endpoint (GET /__worker/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Controlling version, None while running pass-through
    pub version: Option<String>,
    pub worker_state: Option<WorkerState>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(version: Option<String>, worker_state: Option<WorkerState>) -> Self {
        Self {
            status: "healthy".to_string(),
            version,
            worker_state,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for a version rollover (POST /__worker/update)
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResponse {
    /// Success message
    pub message: String,
    /// The version now in control
    pub version: String,
    /// Stores removed during activation
    pub deleted_caches: Vec<String>,
}

impl UpdateResponse {
    pub fn new(version: impl Into<String>, deleted_caches: Vec<String>) -> Self {
        let version = version.into();
        Self {
            message: format!("Version '{}' activated", version),
            version,
            deleted_caches,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
