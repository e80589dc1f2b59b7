//! Messengers — notification channels contributed by extensions.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use gallery_core::{AppError, AppResult};

/// A message handed to a messenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Recipients; interpretation is up to the messenger.
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// A channel able to deliver messages.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Name the messenger is addressed by.
    fn name(&self) -> &str;

    /// Delivers a message.
    async fn send(&self, message: &Message) -> AppResult<()>;
}

struct MessengerEntry {
    owner: String,
    messenger: Arc<dyn Messenger>,
}

/// Registry of messengers from all extensions.
#[derive(Default)]
pub struct MessengerRepository {
    entries: RwLock<Vec<MessengerEntry>>,
}

impl std::fmt::Debug for MessengerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerRepository").finish_non_exhaustive()
    }
}

impl MessengerRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a messenger owned by `owner`. Names are unique.
    pub async fn register(&self, owner: &str, messenger: Arc<dyn Messenger>) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let name = messenger.name().to_string();

        if entries.iter().any(|e| e.messenger.name() == name) {
            return Err(AppError::conflict(format!(
                "Messenger '{name}' is already registered"
            )));
        }

        entries.push(MessengerEntry {
            owner: owner.to_string(),
            messenger,
        });
        info!(extension_id = %owner, messenger = %name, "Messenger registered");
        Ok(())
    }

    /// Removes every messenger owned by `owner`.
    pub async fn unregister_owner(&self, owner: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.owner != owner);
        let removed = before - entries.len();

        debug!(extension_id = %owner, removed, "Messengers released");
        removed
    }

    /// Removes all messengers.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Names of the registered messengers.
    pub async fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .await
            .iter()
            .map(|e| e.messenger.name().to_string())
            .collect()
    }

    /// Delivers `message` through the messenger called `name`.
    pub async fn send(&self, name: &str, message: &Message) -> AppResult<()> {
        let messenger = self
            .entries
            .read()
            .await
            .iter()
            .find(|e| e.messenger.name() == name)
            .map(|e| e.messenger.clone())
            .ok_or_else(|| AppError::not_found(format!("Messenger '{name}' not found")))?;

        messenger.send(message).await
    }
}

/// Messenger registration handle owned by one extension.
#[derive(Debug, Clone)]
pub struct ExtensionMessengers {
    extension_id: String,
    repository: Arc<MessengerRepository>,
}

impl ExtensionMessengers {
    /// Creates a handle registering messengers on behalf of `extension_id`.
    pub fn new(extension_id: impl Into<String>, repository: Arc<MessengerRepository>) -> Self {
        Self {
            extension_id: extension_id.into(),
            repository,
        }
    }

    /// Adds a messenger.
    pub async fn add(&self, messenger: Arc<dyn Messenger>) -> AppResult<()> {
        self.repository.register(&self.extension_id, messenger).await
    }
}
