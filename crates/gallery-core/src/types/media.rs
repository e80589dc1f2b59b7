//! Media records resolved from the gallery.

use serde::{Deserialize, Serialize};

/// Kind of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
}

/// A media item in the gallery, addressed by its library-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Library-relative path of the directory containing the item.
    pub directory: String,
    /// File name.
    pub name: String,
    /// Photo or video.
    pub kind: MediaKind,
}

impl MediaRecord {
    /// Returns the library-relative path of the item.
    pub fn path(&self) -> String {
        if self.directory.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.directory, self.name)
        }
    }
}
