//! Registration
//!
//! Plays the host's part in the worker lifecycle: installs a new version,
//! lets it supersede the current controller and activates it.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::OfflineWorker;
use crate::error::Result;

/// Tracks which worker version controls requests.
#[derive(Debug, Default)]
pub struct Registration {
    controller: RwLock<Option<Arc<OfflineWorker>>>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    /// The worker currently intercepting requests, if any.
    pub async fn controller(&self) -> Option<Arc<OfflineWorker>> {
        self.controller.read().await.clone()
    }

    // == Register ==
    /// Installs `worker` and, on success, makes it the controller.
    ///
    /// If install fails the previous controller keeps serving and the error
    /// is returned. A successful install skips waiting: the previous worker
    /// becomes redundant right away, then the new one activates and claims
    /// clients.
    ///
    /// # Returns
    /// The names of the stores removed during activation.
    pub async fn register(&self, worker: Arc<OfflineWorker>) -> Result<Vec<String>> {
        if let Err(err) = worker.install().await {
            warn!(
                "Registration of {} failed, keeping current controller: {}",
                worker.version(),
                err
            );
            return Err(err);
        }

        self.take_control(worker).await
    }

    // == Resume ==
    /// Restores control after a restart.
    ///
    /// When the storage still holds a complete core store for `worker`'s
    /// version it takes control without fetching anything. Otherwise this
    /// falls back to [`Registration::register`].
    pub async fn resume(&self, worker: Arc<OfflineWorker>) -> Result<Vec<String>> {
        if !worker.resume_install().await? {
            return self.register(worker).await;
        }
        self.take_control(worker).await
    }

    /// Makes an installed worker the controller and activates it.
    async fn take_control(&self, worker: Arc<OfflineWorker>) -> Result<Vec<String>> {
        let previous = self.controller.write().await.replace(worker.clone());
        if let Some(previous) = previous {
            previous.mark_redundant().await;
            info!("{} superseded by {}", previous.version(), worker.version());
        }

        worker.activate().await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cache::CacheStorage;
    use crate::config::WorkerConfig;
    use crate::worker::WorkerState;

    #[tokio::test]
    async fn test_first_registration_becomes_controller() {
        let storage = CacheStorage::new();
        let site = site().await;
        let registration = Registration::new();
        assert!(registration.controller().await.is_none());

        let v1 = Arc::new(worker(WorkerConfig::new(origin(), "v1"), &storage, &site));
        let deleted = registration.register(v1.clone()).await.unwrap();

        assert!(deleted.is_empty());
        let controller = registration.controller().await.unwrap();
        assert_eq!(controller.version(), "v1");
        assert_eq!(controller.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_version_rollover_supersedes_previous() {
        let storage = CacheStorage::new();
        let site = site().await;
        let registration = Registration::new();

        let v1 = Arc::new(worker(WorkerConfig::new(origin(), "v1"), &storage, &site));
        registration.register(v1.clone()).await.unwrap();
        let v2 = Arc::new(worker(WorkerConfig::new(origin(), "v2"), &storage, &site));
        let deleted = registration.register(v2).await.unwrap();

        assert_eq!(deleted, vec!["offline-core-v1"]);
        assert_eq!(v1.state().await, WorkerState::Redundant);
        assert_eq!(registration.controller().await.unwrap().version(), "v2");
        assert_eq!(storage.names().await, vec!["offline-core-v2"]);
    }

    #[tokio::test]
    async fn test_failed_install_keeps_previous_controller() {
        let storage = CacheStorage::new();
        let site = site().await;
        let registration = Registration::new();

        let v1 = Arc::new(worker(WorkerConfig::new(origin(), "v1"), &storage, &site));
        registration.register(v1.clone()).await.unwrap();

        site.set_online(false);
        let v2 = Arc::new(worker(WorkerConfig::new(origin(), "v2"), &storage, &site));
        assert!(registration.register(v2.clone()).await.is_err());

        assert_eq!(v2.state().await, WorkerState::Redundant);
        assert_eq!(v1.state().await, WorkerState::Activated);
        assert_eq!(registration.controller().await.unwrap().version(), "v1");
        assert_eq!(storage.names().await, vec!["offline-core-v1"]);
    }

    #[tokio::test]
    async fn test_resume_serves_cached_version_while_offline() {
        let storage = CacheStorage::new();
        let site = site().await;
        let config = WorkerConfig::new(origin(), "v1");
        Registration::new()
            .register(Arc::new(worker(config.clone(), &storage, &site)))
            .await
            .unwrap();

        // Restart: fresh registration over the restored stores
        site.set_online(false);
        let restored = CacheStorage::from_stores(storage.export().await);
        let registration = Registration::new();
        registration
            .resume(Arc::new(worker(config, &restored, &site)))
            .await
            .unwrap();

        let controller = registration.controller().await.unwrap();
        assert_eq!(controller.state().await, WorkerState::Activated);
        let page = controller
            .network_first(&crate::request::RequestDescriptor::navigation(
                origin().join("/about.html").unwrap(),
            ))
            .await
            .unwrap();
        assert_eq!(page.body, "core /about.html");
    }

    #[tokio::test]
    async fn test_resume_without_cache_installs() {
        let storage = CacheStorage::new();
        let site = site().await;
        let registration = Registration::new();

        let v1 = Arc::new(worker(WorkerConfig::new(origin(), "v1"), &storage, &site));
        registration.resume(v1).await.unwrap();

        assert_eq!(registration.controller().await.unwrap().version(), "v1");
        assert!(storage.has("offline-core-v1").await);
    }

    #[tokio::test]
    async fn test_resume_without_cache_offline_fails() {
        let storage = CacheStorage::new();
        let site = site().await;
        site.set_online(false);
        let registration = Registration::new();

        let v1 = Arc::new(worker(WorkerConfig::new(origin(), "v1"), &storage, &site));
        assert!(registration.resume(v1).await.is_err());
        assert!(registration.controller().await.is_none());
    }
}
