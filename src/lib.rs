//! Offline Cache - an offline-first caching proxy
//!
//! Serves a static site through versioned core caches and a bounded runtime
//! cache, answering cache-first or network-first per request and falling
//! back to an offline page when the origin is unreachable.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod network;
pub mod request;
pub mod tasks;
pub mod worker;

pub use api::AppState;
pub use config::{Config, WorkerConfig};
pub use error::{Result, WorkerError};
pub use worker::{OfflineWorker, Registration};
