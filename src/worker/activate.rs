//! Activation
//!
//! Garbage-collects stores left by other versions and claims clients.

use std::sync::atomic::Ordering;

use tracing::info;

use super::{OfflineWorker, WorkerState};
use crate::error::{Result, WorkerError};

impl OfflineWorker {
    // == Activate ==
    /// Deletes every store not named for this version, then takes control.
    ///
    /// Afterwards at most two stores exist: this version's core store and,
    /// once something has been cached at runtime, its runtime store.
    ///
    /// # Returns
    /// The names of the deleted stores.
    pub async fn activate(&self) -> Result<Vec<String>> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Installed {
                return Err(WorkerError::InvalidState(format!(
                    "cannot activate a worker that is {:?}",
                    *state
                )));
            }
            *state = WorkerState::Activating;
        }

        let mut deleted = Vec::new();
        for name in self.storage.names().await {
            if name != self.core_name
                && name != self.runtime_name
                && self.storage.delete_store(&name).await
            {
                deleted.push(name);
            }
        }

        self.clients_claimed.store(true, Ordering::SeqCst);
        *self.state.write().await = WorkerState::Activated;

        info!(
            "Activated {}: removed {} stale stores {:?}",
            self.config.version,
            deleted.len(),
            deleted
        );
        Ok(deleted)
    }
}
