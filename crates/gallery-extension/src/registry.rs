//! Extension registry — the authoritative map of active extensions.
//!
//! Instances are keyed by a unique id derived from the display name. Because
//! initialization awaits extension code, ids are first *reserved* and only
//! become active once `init` succeeds; reserved ids count as taken.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use gallery_core::{AppError, AppResult};

use crate::api::context::ExtensionContext;
use crate::extension::Extension;

/// An initialized extension.
pub struct ExtensionInstance {
    /// Collision-resolved identifier; also the route namespace.
    pub unique_id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Folder the extension was loaded from.
    pub folder_name: String,
    /// The loaded extension.
    pub extension: Arc<dyn Extension>,
    /// Capability object handed to `init`.
    pub context: ExtensionContext,
    /// Activation time.
    pub loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for ExtensionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionInstance")
            .field("unique_id", &self.unique_id)
            .field("display_name", &self.display_name)
            .field("folder_name", &self.folder_name)
            .field("loaded_at", &self.loaded_at)
            .finish_non_exhaustive()
    }
}

impl ExtensionInstance {
    /// Returns the serializable summary of this instance.
    pub fn info(&self) -> ExtensionInfo {
        ExtensionInfo {
            unique_id: self.unique_id.clone(),
            display_name: self.display_name.clone(),
            folder_name: self.folder_name.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Metadata about an active extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionInfo {
    /// Unique id.
    pub unique_id: String,
    /// Display name.
    pub display_name: String,
    /// Folder name.
    pub folder_name: String,
    /// Activation time.
    pub loaded_at: DateTime<Utc>,
}

#[derive(Default)]
struct RegistryState {
    /// Unique id → active instance.
    active: HashMap<String, Arc<ExtensionInstance>>,
    /// Unique id → folder, for ids whose `init` is still running.
    reserved: HashMap<String, String>,
}

impl RegistryState {
    fn is_taken(&self, id: &str) -> bool {
        self.active.contains_key(id) || self.reserved.contains_key(id)
    }

    fn next_free(&self, display_name: &str) -> String {
        if !self.is_taken(display_name) {
            return display_name.to_string();
        }
        (1u64..)
            .map(|n| format!("{display_name}_{n}"))
            .find(|candidate| !self.is_taken(candidate))
            .unwrap_or_else(|| display_name.to_string())
    }

    fn folder_in_use(&self, folder_name: &str) -> bool {
        self.active.values().any(|i| i.folder_name == folder_name)
            || self.reserved.values().any(|f| f == folder_name)
    }
}

/// Registry of active extensions.
#[derive(Default)]
pub struct ExtensionRegistry {
    state: RwLock<RegistryState>,
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionRegistry").finish_non_exhaustive()
    }
}

impl ExtensionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id `display_name` would get right now.
    ///
    /// The display name itself when free, otherwise the first free
    /// `display_name_<n>` for `n = 1, 2, …`.
    pub async fn resolve_unique_id(&self, display_name: &str) -> String {
        self.state.read().await.next_free(display_name)
    }

    /// Resolves and reserves a unique id for `folder_name` in one step.
    ///
    /// Fails with `Conflict` when the folder already has an active or
    /// initializing instance.
    pub async fn reserve(&self, display_name: &str, folder_name: &str) -> AppResult<String> {
        let mut state = self.state.write().await;

        if state.folder_in_use(folder_name) {
            return Err(AppError::conflict(format!(
                "Extension folder '{folder_name}' is already loaded"
            )));
        }

        let id = state.next_free(display_name);
        state.reserved.insert(id.clone(), folder_name.to_string());

        debug!(extension_id = %id, folder = %folder_name, "Extension id reserved");
        Ok(id)
    }

    /// Promotes a reservation to an active instance.
    pub async fn activate(&self, instance: ExtensionInstance) -> AppResult<Arc<ExtensionInstance>> {
        let mut state = self.state.write().await;

        if state.reserved.remove(&instance.unique_id).is_none() {
            return Err(AppError::internal(format!(
                "Extension id '{}' was not reserved",
                instance.unique_id
            )));
        }

        let instance = Arc::new(instance);
        state
            .active
            .insert(instance.unique_id.clone(), instance.clone());

        info!(
            extension_id = %instance.unique_id,
            folder = %instance.folder_name,
            name = %instance.display_name,
            "Extension activated"
        );
        Ok(instance)
    }

    /// Drops a reservation without activating it.
    pub async fn release(&self, unique_id: &str) {
        if self.state.write().await.reserved.remove(unique_id).is_some() {
            debug!(extension_id = %unique_id, "Extension id released");
        }
    }

    /// Removes an active instance.
    pub async fn remove(&self, unique_id: &str) -> Option<Arc<ExtensionInstance>> {
        let removed = self.state.write().await.active.remove(unique_id);
        if removed.is_some() {
            info!(extension_id = %unique_id, "Extension removed from registry");
        }
        removed
    }

    /// Gets an active instance by unique id.
    pub async fn get(&self, unique_id: &str) -> Option<Arc<ExtensionInstance>> {
        self.state.read().await.active.get(unique_id).cloned()
    }

    /// Reverse lookup of the active instance loaded from `folder_name`.
    pub async fn find_by_folder(&self, folder_name: &str) -> Option<Arc<ExtensionInstance>> {
        self.state
            .read()
            .await
            .active
            .values()
            .find(|i| i.folder_name == folder_name)
            .cloned()
    }

    /// All active instances, ordered by unique id.
    pub async fn list(&self) -> Vec<Arc<ExtensionInstance>> {
        let state = self.state.read().await;
        let mut instances: Vec<_> = state.active.values().cloned().collect();
        instances.sort_by(|a, b| a.unique_id.cmp(&b.unique_id));
        instances
    }

    /// Number of active instances.
    pub async fn count(&self) -> usize {
        self.state.read().await.active.len()
    }

    /// Whether `unique_id` is active.
    pub async fn contains(&self, unique_id: &str) -> bool {
        self.state.read().await.active.contains_key(unique_id)
    }
}
