//! Cache Module
//!
//! Named response stores with insertion-order tracking, FIFO trimming and
//! on-disk snapshots.

mod entry;
mod order;
mod snapshot;
mod stats;
mod storage;
mod store;
mod trim;


// Re-export public types
pub use entry::{RequestKey, ResponseKind, StoredResponse};
pub use order::InsertionOrder;
pub use snapshot::{load_snapshot, save_snapshot};
pub use stats::CacheStats;
pub use storage::CacheStorage;
pub use store::CacheStore;
pub use trim::trim_cache;
