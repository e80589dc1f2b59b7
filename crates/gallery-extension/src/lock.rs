//! Per-folder serialization of lifecycle operations.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per extension folder.
///
/// Lifecycle operations on the same folder run one at a time; different
/// folders proceed concurrently.
#[derive(Debug, Default)]
pub struct FolderLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl FolderLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and takes the lock of `folder_name`.
    pub async fn acquire(&self, folder_name: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(folder_name.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}
