//! Fetch Strategies
//!
//! Cache-first and network-first serving, sharing the runtime write path
//! and the offline fallback.

use tracing::{debug, warn};

use super::{OfflineWorker, WorkerState};
use crate::cache::{RequestKey, StoredResponse};
use crate::error::{Result, WorkerError};
use crate::request::RequestDescriptor;

impl OfflineWorker {
    // == Cache First ==
    /// Serves from the core or runtime store when possible; otherwise fetches.
    ///
    /// A hit never touches the network. On a miss the live response is
    /// returned whether or not it was cacheable. When the network fails,
    /// document requests get the offline page; anything else gets the error.
    pub async fn cache_first(&self, request: &RequestDescriptor) -> Result<StoredResponse> {
        let key = request.cache_key();
        if let Some(cached) = self.storage.match_first(&self.lookup_order(), &key).await {
            debug!(url = %request.url, "served from cache");
            return Ok(cached);
        }

        match self.fetch_and_store(request).await {
            Ok(response) => Ok(response),
            Err(err) => self.offline_fallback(request, err).await,
        }
    }

    // == Network First ==
    /// Serves the live response when the network answers; otherwise falls
    /// back to any cached copy, then to the offline page for documents.
    pub async fn network_first(&self, request: &RequestDescriptor) -> Result<StoredResponse> {
        match self.fetch_and_store(request).await {
            Ok(response) => Ok(response),
            Err(err) => {
                let key = request.cache_key();
                if let Some(cached) = self.storage.match_first(&self.lookup_order(), &key).await {
                    debug!(url = %request.url, "network failed, served from cache");
                    return Ok(cached);
                }
                self.offline_fallback(request, err).await
            }
        }
    }

    /// Single network attempt; eligible responses are copied into the
    /// runtime store and a trim is started without waiting for it.
    async fn fetch_and_store(&self, request: &RequestDescriptor) -> Result<StoredResponse> {
        self.storage.record(|stats| stats.record_network_fetch()).await;
        let response = self.fetcher.fetch(request).await?;

        // A replaced worker must not recreate a store its successor deleted
        if response.is_cacheable() && self.state().await == WorkerState::Activated {
            self.storage
                .put(&self.runtime_name, request.cache_key(), response.clone())
                .await;
            self.storage.record(|stats| stats.record_runtime_write()).await;
            self.schedule_trim().await;
        }

        Ok(response)
    }

    async fn offline_fallback(
        &self,
        request: &RequestDescriptor,
        err: WorkerError,
    ) -> Result<StoredResponse> {
        if request.wants_document() {
            if let Some(page) = self.offline_page().await {
                warn!(url = %request.url, "network unavailable, serving offline page");
                self.storage.record(|stats| stats.record_offline_fallback()).await;
                return Ok(page);
            }
        }
        Err(err)
    }

    async fn offline_page(&self) -> Option<StoredResponse> {
        let url = self.config.origin.join(&self.config.offline_url).ok()?;
        self.storage
            .match_first(&self.lookup_order(), &RequestKey::from_url(&url))
            .await
    }
}
