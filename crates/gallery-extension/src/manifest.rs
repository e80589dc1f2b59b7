//! Optional `extension.toml` manifest inside an extension folder.

use std::path::Path;

use serde::{Deserialize, Serialize};

use gallery_core::{AppError, AppResult};

/// Metadata an extension may declare about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtensionManifest {
    /// Display name; the folder name when absent.
    pub name: Option<String>,
    /// Version string.
    pub version: Option<String>,
    /// Short description.
    pub description: Option<String>,
    /// Author or maintainer.
    pub author: Option<String>,
}

impl ExtensionManifest {
    /// Reads `<folder>/<file_name>`; `None` when the file does not exist.
    pub async fn read(folder: &Path, file_name: &str) -> AppResult<Option<Self>> {
        let path = folder.join(file_name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&text).map(Some).map_err(|e| {
            AppError::validation(format!("Invalid manifest '{}': {e}", path.display()))
        })
    }

    /// The display name, falling back to `folder_name`.
    pub fn display_name(&self, folder_name: &str) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(folder_name)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_name_from_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(
            dir.path().join("extension.toml"),
            "name = \"Sample\"\nversion = \"1.2.0\"\n",
        )
        .await
        .expect("write");

        let manifest = ExtensionManifest::read(dir.path(), "extension.toml")
            .await
            .expect("read")
            .expect("manifest");
        assert_eq!(manifest.display_name("sample-folder"), "Sample");
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = ExtensionManifest::read(dir.path(), "extension.toml")
            .await
            .expect("read");
        assert!(manifest.is_none());
        assert_eq!(
            ExtensionManifest::default().display_name("sample-folder"),
            "sample-folder"
        );
    }

    #[tokio::test]
    async fn test_invalid_manifest_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        tokio::fs::write(dir.path().join("extension.toml"), "name = [")
            .await
            .expect("write");
        assert!(
            ExtensionManifest::read(dir.path(), "extension.toml")
                .await
                .is_err()
        );
    }
}
