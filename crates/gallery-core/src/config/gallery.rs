//! Media library configuration.

use serde::{Deserialize, Serialize};

/// Media library configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// Root directory of the photo/video library.
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

fn default_root() -> String {
    "./media".to_string()
}
