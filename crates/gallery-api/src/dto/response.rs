//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gallery_core::types::MediaKind;

pub use gallery_core::types::ApiResponse;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
    /// Number of active extensions.
    pub active_extensions: usize,
}

/// Metadata of one media item; the output of the metadata hooks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Library-relative path.
    pub path: String,
    /// Containing directory.
    pub directory: String,
    /// File name.
    pub name: String,
    /// Photo or video.
    pub kind: MediaKind,
    /// File size.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified: Option<DateTime<Utc>>,
    /// Keywords; extensions may add to these.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Search hits; the output of the search hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Library-relative media paths.
    #[serde(default)]
    pub items: Vec<String>,
}
