//! Removes data directories of extensions that are no longer installed.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use gallery_core::AppResult;
use gallery_core::traits::StorageJanitor;

/// Prunes `<data_root>/<folder>` directories not belonging to a configured
/// extension.
#[derive(Debug, Clone)]
pub struct DataDirectoryJanitor {
    data_root: PathBuf,
}

impl DataDirectoryJanitor {
    /// Creates a janitor for `data_root`.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }
}

#[async_trait]
impl StorageJanitor for DataDirectoryJanitor {
    async fn prune_unreferenced(&self, kept_folders: &[String]) -> AppResult<()> {
        let mut entries = match tokio::fs::read_dir(&self.data_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let mut pruned = 0usize;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if kept_folders.iter().any(|f| *f == name) {
                continue;
            }
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => pruned += 1,
                Err(e) => warn!(
                    path = %entry.path().display(),
                    error = %e,
                    "Failed to prune extension data"
                ),
            }
        }

        info!(root = %self.data_root.display(), pruned, "Unused extension data pruned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prunes_only_unconfigured_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["active", "stale"] {
            tokio::fs::create_dir_all(dir.path().join(name))
                .await
                .expect("mkdir");
        }
        tokio::fs::write(dir.path().join("notes.txt"), "x")
            .await
            .expect("write");

        DataDirectoryJanitor::new(dir.path())
            .prune_unreferenced(&["active".to_string()])
            .await
            .expect("prune");

        assert!(dir.path().join("active").is_dir());
        assert!(!dir.path().join("stale").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_root_is_fine() {
        let dir = tempfile::tempdir().expect("tempdir");
        DataDirectoryJanitor::new(dir.path().join("missing"))
            .prune_unreferenced(&[])
            .await
            .expect("prune");
    }
}
