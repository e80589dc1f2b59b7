//! Persisted per-extension configuration.
//!
//! The on-disk layout is a single JSON object mapping folder name to
//! `{ "path", "enabled", "configs" }`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use gallery_core::AppResult;

/// Enablement and settings of one installed extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionConfigEntry {
    /// Folder name; the key of the entry.
    pub path: String,
    /// Whether the extension is initialized on startup.
    pub enabled: bool,
    /// Extension-owned settings.
    #[serde(default)]
    pub configs: Value,
}

impl ExtensionConfigEntry {
    /// An enabled entry with no settings yet.
    pub fn enabled(folder_name: impl Into<String>) -> Self {
        Self {
            path: folder_name.into(),
            enabled: true,
            configs: Value::Null,
        }
    }
}

/// Storage of extension config entries.
#[async_trait]
pub trait ExtensionConfigStore: Send + Sync + std::fmt::Debug {
    /// All entries, ordered by folder name.
    async fn list(&self) -> AppResult<Vec<ExtensionConfigEntry>>;

    /// The entry of `folder_name`, if any.
    async fn get(&self, folder_name: &str) -> AppResult<Option<ExtensionConfigEntry>>;

    /// Inserts or replaces an entry.
    async fn upsert(&self, entry: ExtensionConfigEntry) -> AppResult<()>;

    /// Removes an entry; returns whether it existed.
    async fn remove(&self, folder_name: &str) -> AppResult<bool>;

    /// Replaces only the settings of an existing entry.
    ///
    /// Returns `false` and writes nothing when the entry does not exist.
    async fn update_configs(&self, folder_name: &str, configs: Value) -> AppResult<bool>;
}

/// Config store backed by a JSON file, cached in memory.
#[derive(Debug)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, ExtensionConfigEntry>>,
}

impl JsonFileConfigStore {
    /// Opens the store at `path`; a missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            path = %path.display(),
            entries = entries.len(),
            "Extension config store opened"
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole map through a temp file and a rename.
    async fn persist(&self, entries: &BTreeMap<String, ExtensionConfigEntry>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "Extension config persisted");
        Ok(())
    }
}

#[async_trait]
impl ExtensionConfigStore for JsonFileConfigStore {
    async fn list(&self) -> AppResult<Vec<ExtensionConfigEntry>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn get(&self, folder_name: &str) -> AppResult<Option<ExtensionConfigEntry>> {
        Ok(self.entries.read().await.get(folder_name).cloned())
    }

    async fn upsert(&self, entry: ExtensionConfigEntry) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.insert(entry.path.clone(), entry);

        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, folder_name: &str) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(folder_name) {
            return Ok(false);
        }

        let mut next = entries.clone();
        next.remove(folder_name);

        self.persist(&next).await?;
        *entries = next;
        Ok(true)
    }

    async fn update_configs(&self, folder_name: &str, configs: Value) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        let Some(entry) = next.get_mut(folder_name) else {
            return Ok(false);
        };
        entry.configs = configs;

        self.persist(&next).await?;
        *entries = next;
        Ok(true)
    }
}
