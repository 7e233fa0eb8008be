//! Snapshot Module
//!
//! Persists cache storage to a JSON file so stores survive restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheStorage, CacheStore, RequestKey, StoredResponse};
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
struct StoreSnapshot {
    name: String,
    /// Entries oldest first, so insertion order survives a reload
    entries: Vec<(RequestKey, StoredResponse)>,
}

// == Save ==
/// Writes every store to `path`.
///
/// The file is written next to `path` and renamed into place, so a crash
/// mid-write leaves the previous snapshot intact.
pub async fn save_snapshot(storage: &CacheStorage, path: &Path) -> Result<()> {
    let stores: Vec<StoreSnapshot> = storage
        .export()
        .await
        .into_iter()
        .map(|(name, store)| StoreSnapshot {
            name,
            entries: store
                .keys()
                .into_iter()
                .filter_map(|key| store.get(&key).map(|response| (key, response)))
                .collect(),
        })
        .collect();

    let json = serde_json::to_vec(&stores)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;

    info!("Saved {} cache stores to {}", stores.len(), path.display());
    Ok(())
}

/// `path` with `.tmp` appended to the full file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// == Load ==
/// Reads stores from `path`; a missing file yields empty storage.
pub async fn load_snapshot(path: &Path) -> Result<CacheStorage> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("No snapshot at {}, starting empty", path.display());
            return Ok(CacheStorage::new());
        }
        Err(err) => return Err(err.into()),
    };

    let snapshots: Vec<StoreSnapshot> = serde_json::from_slice(&bytes)?;
    info!("Loaded {} cache stores from {}", snapshots.len(), path.display());

    let stores = snapshots
        .into_iter()
        .map(|snapshot| {
            let mut store = CacheStore::new();
            for (key, response) in snapshot.entries {
                store.put(key, response);
            }
            (snapshot.name, store)
        })
        .collect();

    Ok(CacheStorage::from_stores(stores))
}
