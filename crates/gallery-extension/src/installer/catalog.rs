//! Extension catalog — lists installable extensions and fetches archives.
//!
//! Locations starting with `http://` or `https://` go through `reqwest`;
//! anything else (optionally prefixed with `file://`) is read from disk.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gallery_core::AppResult;

use super::error::InstallError;

/// An installable extension as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescriptor {
    /// Catalog id.
    pub id: String,
    /// Folder the extension installs into; the id when not listed.
    #[serde(default)]
    pub folder_name: String,
    /// Human-readable name.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Archive location.
    #[serde(rename = "zipUrl", default)]
    pub download_url: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author or maintainer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ExtensionDescriptor {
    fn normalized(mut self) -> Self {
        if self.folder_name.trim().is_empty() {
            self.folder_name = self.id.clone();
        }
        self
    }
}

/// Source of installable extensions.
#[async_trait]
pub trait CatalogClient: Send + Sync + std::fmt::Debug {
    /// Lists the catalog.
    async fn list(&self) -> AppResult<Vec<ExtensionDescriptor>>;

    /// Downloads the archive at `url` to `destination`.
    async fn download(&self, url: &str, destination: &Path) -> AppResult<()>;
}

/// Catalog client over HTTP(S) or the local filesystem.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    location: String,
    http: reqwest::Client,
}

impl HttpCatalogClient {
    /// Creates a client for the catalog at `location`.
    pub fn new(location: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| InstallError::Catalog {
                location: "<client>".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            location: location.into(),
            http,
        })
    }

    /// The catalog location.
    pub fn location(&self) -> &str {
        &self.location
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn local_path(location: &str) -> &Path {
    Path::new(location.strip_prefix("file://").unwrap_or(location))
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list(&self) -> AppResult<Vec<ExtensionDescriptor>> {
        let bytes = if is_remote(&self.location) {
            self.fetch_remote(&self.location).await
        } else {
            tokio::fs::read(local_path(&self.location))
                .await
                .map_err(|e| e.to_string())
        }
        .map_err(|reason| InstallError::Catalog {
            location: self.location.clone(),
            reason,
        })?;

        let entries: Vec<ExtensionDescriptor> =
            serde_json::from_slice(&bytes).map_err(|e| InstallError::Catalog {
                location: self.location.clone(),
                reason: format!("invalid catalog: {e}"),
            })?;

        debug!(location = %self.location, entries = entries.len(), "Catalog fetched");
        Ok(entries.into_iter().map(ExtensionDescriptor::normalized).collect())
    }

    async fn download(&self, url: &str, destination: &Path) -> AppResult<()> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let download_error = |reason: String| InstallError::Download {
            url: url.to_string(),
            reason,
        };

        if is_remote(url) {
            let bytes = self.fetch_remote(url).await.map_err(download_error)?;
            tokio::fs::write(destination, &bytes).await?;
        } else {
            tokio::fs::copy(local_path(url), destination)
                .await
                .map_err(|e| download_error(e.to_string()))?;
        }

        info!(url = %url, destination = %destination.display(), "Extension archive downloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gallery_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_local_catalog_defaults_folder_to_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        tokio::fs::write(
            &path,
            r#"[
                {"id": "sample", "name": "Sample", "zipUrl": "/tmp/sample.zip", "version": "1.0.0"},
                {"id": "other", "folderName": "other-dir", "name": "Other"}
            ]"#,
        )
        .await
        .expect("write");

        let client =
            HttpCatalogClient::new(format!("file://{}", path.display())).expect("client");
        let entries = client.list().await.expect("list");

        assert_eq!(entries[0].folder_name, "sample");
        assert_eq!(entries[0].download_url.as_deref(), Some("/tmp/sample.zip"));
        assert_eq!(entries[1].folder_name, "other-dir");
        assert!(entries[1].download_url.is_none());
    }

    #[tokio::test]
    async fn test_missing_catalog_is_external_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let client = HttpCatalogClient::new(dir.path().join("none.json").display().to_string())
            .expect("client");
        let err = client.list().await.expect_err("missing");
        assert_eq!(err.kind, ErrorKind::ExternalService);
    }

    #[tokio::test]
    async fn test_local_download_copies_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("a.zip");
        tokio::fs::write(&source, b"PK").await.expect("write");

        let client = HttpCatalogClient::new("unused").expect("client");
        let destination = dir.path().join("scratch").join("b.zip");
        client
            .download(&source.display().to_string(), &destination)
            .await
            .expect("download");

        assert_eq!(tokio::fs::read(&destination).await.expect("read"), b"PK");
    }
}
