//! Worker Module
//!
//! One deployed version of the offline cache policy. A worker is installed
//! (core assets cached), activated (stale versions removed) and then
//! intercepts fetches, serving them cache-first or network-first.
//!
//! Cache state lives in the `CacheStorage` handle passed in at construction;
//! the worker itself only holds its config, its lifecycle state and the
//! handles of background trims it has started.

mod activate;
mod classifier;
mod install;
mod registration;
mod strategy;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{CacheStorage, StoredResponse};
use crate::config::WorkerConfig;
use crate::error::Result;
use crate::network::Fetcher;
use crate::request::RequestDescriptor;
use crate::tasks::spawn_trim_task;

pub use classifier::{classify, request_class, RequestClass, Route, Strategy};
pub use registration::Registration;

/// Lifecycle of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Failed to install, or replaced by a newer version
    Redundant,
}

/// Result of offering a request to the worker.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The worker declined; the request should go to the network untouched
    PassThrough(RequestDescriptor),
    /// The worker answered, or surfaced a failure to the page
    Respond(Result<StoredResponse>),
}

// == Offline Worker ==
pub struct OfflineWorker {
    config: WorkerConfig,
    core_name: String,
    runtime_name: String,
    storage: CacheStorage,
    fetcher: Arc<dyn Fetcher>,
    state: RwLock<WorkerState>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
    pending_trims: Mutex<Vec<JoinHandle<usize>>>,
}

impl OfflineWorker {
    pub fn new(config: WorkerConfig, storage: CacheStorage, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            core_name: config.core_cache_name(),
            runtime_name: config.runtime_cache_name(),
            config,
            storage,
            fetcher,
            state: RwLock::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
            pending_trims: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn core_cache_name(&self) -> &str {
        &self.core_name
    }

    pub fn runtime_cache_name(&self) -> &str {
        &self.runtime_name
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether install asked to replace any waiting version immediately.
    pub fn skips_waiting(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Whether activation took control of open clients.
    pub fn has_claimed_clients(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    pub(crate) async fn mark_redundant(&self) {
        *self.state.write().await = WorkerState::Redundant;
    }

    // == Handle Fetch ==
    /// Offers a request to the worker.
    ///
    /// Only an activated worker intercepts; otherwise, and for requests the
    /// classifier does not route, the request is handed back untouched.
    pub async fn handle_fetch(&self, request: RequestDescriptor) -> FetchOutcome {
        if self.state().await != WorkerState::Activated {
            return FetchOutcome::PassThrough(request);
        }

        match classify(&request, &self.config) {
            Route::PassThrough => FetchOutcome::PassThrough(request),
            Route::Handle { class, strategy } => {
                debug!(url = %request.url, ?class, ?strategy, "intercepted request");
                let result = match strategy {
                    Strategy::CacheFirst => self.cache_first(&request).await,
                    Strategy::NetworkFirst => self.network_first(&request).await,
                };
                FetchOutcome::Respond(result)
            }
        }
    }

    // == Background Trims ==
    async fn schedule_trim(&self) {
        let handle = spawn_trim_task(
            self.storage.clone(),
            self.runtime_name.clone(),
            self.config.max_runtime_entries,
        );

        let mut pending = self.pending_trims.lock().await;
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Waits for every trim started so far, returning the entries they evicted.
    pub async fn settle(&self) -> usize {
        let handles = std::mem::take(&mut *self.pending_trims.lock().await);

        let mut evicted = 0;
        for handle in handles {
            if let Ok(count) = handle.await {
                evicted += count;
            }
        }
        evicted
    }

    /// Stores this worker consults, in lookup order.
    fn lookup_order(&self) -> [String; 2] {
        [self.core_name.clone(), self.runtime_name.clone()]
    }
}

impl std::fmt::Debug for OfflineWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineWorker")
            .field("version", &self.config.version)
            .field("core", &self.core_name)
            .field("runtime", &self.runtime_name)
            .finish_non_exhaustive()
    }
}
