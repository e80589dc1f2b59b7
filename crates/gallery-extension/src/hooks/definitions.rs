//! Hook point definitions and the values passed through hook chains.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Enumeration of the extension points exposed by the gallery core.
///
/// Each point has a stable string path so dynamically loaded extensions and
/// configuration can refer to it without linking against this enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum HookPoint {
    // ── Disk ──
    /// Scanning a gallery directory on disk.
    ScanDirectory,

    // ── Metadata ──
    /// Loading metadata of a photo.
    LoadPhotoMetadata,
    /// Loading metadata of a video.
    LoadVideoMetadata,

    // ── Indexing ──
    /// Persisting a scanned directory to the index.
    SaveToIndex,

    // ── Rendering ──
    /// Rendering a thumbnail or preview image.
    RenderImage,

    // ── Search ──
    /// Running a gallery search query.
    Search,

    /// Any hook path not known to this build.
    Custom(String),
}

impl HookPoint {
    /// Returns the stable path of this hook point.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ScanDirectory => "gallery/disk/scan_directory",
            Self::LoadPhotoMetadata => "gallery/metadata/load_photo_metadata",
            Self::LoadVideoMetadata => "gallery/metadata/load_video_metadata",
            Self::SaveToIndex => "gallery/indexing/save_to_index",
            Self::RenderImage => "gallery/renderer/render_image",
            Self::Search => "gallery/search/search",
            Self::Custom(path) => path,
        }
    }

    /// All built-in hook points.
    pub fn builtin() -> [HookPoint; 6] {
        [
            Self::ScanDirectory,
            Self::LoadPhotoMetadata,
            Self::LoadVideoMetadata,
            Self::SaveToIndex,
            Self::RenderImage,
            Self::Search,
        ]
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for HookPoint {
    fn from(path: &str) -> Self {
        Self::builtin()
            .into_iter()
            .find(|hook| hook.as_str() == path)
            .unwrap_or_else(|| Self::Custom(path.to_string()))
    }
}

impl From<String> for HookPoint {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl From<HookPoint> for String {
    fn from(hook: HookPoint) -> Self {
        hook.as_str().to_string()
    }
}

impl FromStr for HookPoint {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// Which side of the core operation a handler runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    /// Runs before the core operation and may rewrite its input.
    Before,
    /// Runs after the core operation and may rewrite its output.
    After,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// What a before-handler wants the chain to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum BeforeOutcome {
    /// Hand this (possibly rewritten) input to the next handler.
    Continue(Value),
    /// Skip remaining before-handlers and the core operation; this value is
    /// the output seeding the after-chain.
    Stop(Value),
}

/// Value handed to an after-handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AfterData {
    /// The final input that produced the output. Identical for every
    /// after-handler of one trigger.
    pub input: Value,
    /// The running output.
    pub output: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_paths_round_trip() {
        for hook in HookPoint::builtin() {
            assert_eq!(HookPoint::from(hook.as_str()), hook);
        }
    }

    #[test]
    fn test_unknown_path_is_custom() {
        let hook: HookPoint = "vendor/thing".parse().expect("infallible");
        assert_eq!(hook, HookPoint::Custom("vendor/thing".to_string()));
        assert_eq!(hook.to_string(), "vendor/thing");
    }

    #[test]
    fn test_serializes_as_path() {
        let json = serde_json::to_value(HookPoint::RenderImage).expect("serialize");
        assert_eq!(json, serde_json::json!("gallery/renderer/render_image"));
    }
}
