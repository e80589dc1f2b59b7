//! Lifecycle states and operation outcomes.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where an extension folder is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionState {
    /// No config entry exists.
    Unconfigured,
    /// Configured but not running.
    Disabled,
    /// Dependencies are resolved and `init` is running.
    Loading,
    /// Initialized and registered.
    Active,
    /// `clean_up` is running.
    Unloading,
    /// The last initialization attempt failed.
    Failed,
    /// Removed from disk and config.
    Deleted,
}

impl std::fmt::Display for ExtensionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unconfigured => "unconfigured",
            Self::Disabled => "disabled",
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Unloading => "unloading",
            Self::Failed => "failed",
            Self::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

/// Why `init_single` did not load an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The folder has no config entry.
    NotConfigured,
    /// The config entry is disabled.
    Disabled,
    /// The entry-point file is missing from the folder.
    MissingEntryPoint,
}

/// Result of `init_single`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InitOutcome {
    /// The extension is active under `unique_id`.
    Initialized {
        /// Assigned unique id.
        unique_id: String,
    },
    /// Nothing was loaded.
    Skipped {
        /// Why.
        reason: SkipReason,
    },
}

impl InitOutcome {
    /// The unique id, when initialized.
    pub fn unique_id(&self) -> Option<&str> {
        match self {
            Self::Initialized { unique_id } => Some(unique_id),
            Self::Skipped { .. } => None,
        }
    }
}

/// What `init_all` did, per folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitSummary {
    /// `(folder, unique_id)` of initialized extensions.
    pub initialized: Vec<(String, String)>,
    /// `(folder, reason)` of skipped extensions.
    pub skipped: Vec<(String, SkipReason)>,
    /// `(folder, error)` of failed extensions.
    pub failed: Vec<(String, String)>,
}

/// An installed extension as reported by `list_installed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledExtension {
    /// Folder name.
    pub folder_name: String,
    /// Persisted enablement.
    pub enabled: bool,
    /// Current lifecycle state.
    pub state: ExtensionState,
    /// Unique id, when active.
    pub unique_id: Option<String>,
    /// Display name, when active.
    pub display_name: Option<String>,
    /// Activation time, when active.
    pub loaded_at: Option<DateTime<Utc>>,
}
