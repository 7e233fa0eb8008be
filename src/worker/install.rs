//! Installer
//!
//! Fetches the core manifest and commits it to the versioned core store as
//! a single unit.

use std::sync::atomic::Ordering;

use futures::future::try_join_all;
use tracing::{info, warn};

use super::{OfflineWorker, WorkerState};
use crate::cache::{RequestKey, StoredResponse};
use crate::error::{Result, WorkerError};
use crate::request::RequestDescriptor;

impl OfflineWorker {
    // == Install ==
    /// Caches every manifest asset in the core store.
    ///
    /// All assets are fetched before anything is written. If any fetch fails
    /// or returns a non-2xx status the install fails, the worker becomes
    /// redundant and the core store is left untouched.
    pub async fn install(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Parsed {
                return Err(WorkerError::InvalidState(format!(
                    "cannot install a worker that is {:?}",
                    *state
                )));
            }
            *state = WorkerState::Installing;
        }

        info!(
            "Installing {}: fetching {} core assets",
            self.config.version,
            self.config.manifest.len()
        );

        let fetches = self
            .config
            .manifest
            .iter()
            .map(|path| self.fetch_core_asset(path));

        match try_join_all(fetches).await {
            Ok(entries) => {
                let count = entries.len();
                self.storage.put_all(&self.core_name, entries).await;
                self.skip_waiting.store(true, Ordering::SeqCst);
                *self.state.write().await = WorkerState::Installed;
                info!("Installed {}: {} assets in {}", self.config.version, count, self.core_name);
                Ok(())
            }
            Err(err) => {
                *self.state.write().await = WorkerState::Redundant;
                warn!("Install of {} failed: {}", self.config.version, err);
                Err(err)
            }
        }
    }

    // == Resume ==
    /// Adopts a core store left by an earlier run of this same version.
    ///
    /// If the core store already holds every manifest entry the worker moves
    /// straight to Installed without touching the network and `true` is
    /// returned. Otherwise the worker stays Parsed and a regular `install`
    /// is still possible.
    pub async fn resume_install(&self) -> Result<bool> {
        let mut state = self.state.write().await;
        if *state != WorkerState::Parsed {
            return Err(WorkerError::InvalidState(format!(
                "cannot resume a worker that is {:?}",
                *state
            )));
        }

        let Some(keys) = self.manifest_keys() else {
            return Ok(false);
        };
        if !self.storage.holds_all(&self.core_name, &keys).await {
            return Ok(false);
        }

        self.skip_waiting.store(true, Ordering::SeqCst);
        *state = WorkerState::Installed;
        info!(
            "Resumed {} from {} cached core assets in {}",
            self.config.version,
            keys.len(),
            self.core_name
        );
        Ok(true)
    }

    fn manifest_keys(&self) -> Option<Vec<RequestKey>> {
        self.config
            .manifest
            .iter()
            .map(|path| {
                let url = self.config.origin.join(path).ok()?;
                Some(RequestKey::from_url(&url))
            })
            .collect()
    }

    async fn fetch_core_asset(&self, path: &str) -> Result<(RequestKey, StoredResponse)> {
        let url = self
            .config
            .origin
            .join(path)
            .map_err(|e| WorkerError::InstallFailed {
                url: path.to_string(),
                reason: e.to_string(),
            })?;

        let request = RequestDescriptor::get(url);
        let response = self
            .fetcher
            .fetch(&request)
            .await
            .map_err(|e| WorkerError::InstallFailed {
                url: request.url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.is_ok() {
            return Err(WorkerError::InstallFailed {
                url: request.url.to_string(),
                reason: format!("status {}", response.status),
            });
        }

        Ok((request.cache_key(), response))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::cache::CacheStorage;
    use crate::config::WorkerConfig;
    use crate::network::StaticOrigin;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_install_caches_whole_manifest() {
        let storage = CacheStorage::new();
        let site = site().await;
        let config = WorkerConfig::new(origin(), "v1");
        let worker = worker(config.clone(), &storage, &site);

        worker.install().await.unwrap();

        assert_eq!(worker.state().await, WorkerState::Installed);
        assert!(worker.skips_waiting());
        assert_eq!(
            storage.store_len(&config.core_cache_name()).await,
            config.manifest.len()
        );
        // Entries keep manifest order
        let first = storage.entry_keys(&config.core_cache_name()).await[0].clone();
        assert_eq!(first.as_str(), "http://site/");
    }

    #[tokio::test]
    async fn test_install_fails_atomically_on_missing_asset() {
        let storage = CacheStorage::new();
        let site = Arc::new(StaticOrigin::new(origin()));
        site.serve("/", "text/html", "home").await;
        // /index.html and the rest are 404

        let mut config = WorkerConfig::new(origin(), "v1");
        config.manifest = vec!["/".to_string(), "/index.html".to_string()];
        let worker = worker(config.clone(), &storage, &site);

        let err = worker.install().await.unwrap_err();

        assert!(matches!(err, WorkerError::InstallFailed { ref url, .. } if url.ends_with("/index.html")));
        assert_eq!(worker.state().await, WorkerState::Redundant);
        assert!(!worker.skips_waiting());
        assert!(!storage.has(&config.core_cache_name()).await);
    }

    #[tokio::test]
    async fn test_install_fails_when_offline() {
        let storage = CacheStorage::new();
        let site = site().await;
        site.set_online(false);
        let config = WorkerConfig::new(origin(), "v1");
        let worker = worker(config.clone(), &storage, &site);

        assert!(matches!(
            worker.install().await,
            Err(WorkerError::InstallFailed { .. })
        ));
        assert!(storage.names().await.is_empty());
    }

    #[tokio::test]
    async fn test_install_twice_is_rejected() {
        let storage = CacheStorage::new();
        let site = site().await;
        let worker = worker(WorkerConfig::new(origin(), "v1"), &storage, &site);

        worker.install().await.unwrap();
        assert!(matches!(
            worker.install().await,
            Err(WorkerError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_resume_adopts_complete_core_store_offline() {
        let storage = CacheStorage::new();
        let site = site().await;
        let config = WorkerConfig::new(origin(), "v1");
        worker(config.clone(), &storage, &site).install().await.unwrap();

        site.set_online(false);
        let before = site.request_count().await;
        let restarted = worker(config, &storage, &site);

        assert!(restarted.resume_install().await.unwrap());
        assert_eq!(restarted.state().await, WorkerState::Installed);
        assert!(restarted.skips_waiting());
        assert_eq!(site.request_count().await, before);
    }

    #[tokio::test]
    async fn test_resume_declines_incomplete_core_store() {
        let storage = CacheStorage::new();
        let site = site().await;
        let config = WorkerConfig::new(origin(), "v1");
        worker(config.clone(), &storage, &site).install().await.unwrap();
        let about = RequestKey::from_url(&origin().join("/about.html").unwrap());
        storage.delete_entry(&config.core_cache_name(), &about).await;

        let restarted = worker(config, &storage, &site);

        assert!(!restarted.resume_install().await.unwrap());
        assert_eq!(restarted.state().await, WorkerState::Parsed);
        restarted.install().await.unwrap();
    }

    #[tokio::test]
    async fn test_resume_without_core_store() {
        let storage = CacheStorage::new();
        let site = site().await;
        let worker = worker(WorkerConfig::new(origin(), "v1"), &storage, &site);

        assert!(!worker.resume_install().await.unwrap());
        assert_eq!(worker.state().await, WorkerState::Parsed);
    }
}
