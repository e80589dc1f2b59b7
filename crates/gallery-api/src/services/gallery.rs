//! Filesystem-backed media library.
//!
//! Media are addressed by their path relative to `gallery.root`, using `/`
//! separators. Directories whose name starts with `.` are hidden and only
//! reachable by administrators.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use gallery_core::traits::GalleryLookup;
use gallery_core::types::{MediaKind, MediaRecord, SessionUser, UserRole};
use gallery_core::{AppError, AppResult};

use crate::dto::request::SearchQuery;
use crate::dto::response::{MediaMetadata, SearchResult};

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "tif", "tiff", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi", "m4v"];

/// Upper bound on search hits.
pub const MAX_SEARCH_RESULTS: usize = 500;

/// Media library rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsGallery {
    root: PathBuf,
}

impl FsGallery {
    /// Creates a gallery over `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The library root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Reads file-level metadata of a media item.
    pub async fn load_metadata(&self, path: &str) -> AppResult<MediaMetadata> {
        let media = self
            .find_media(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Media '{path}' not found")))?;

        let meta = tokio::fs::metadata(self.root.join(media.path())).await?;
        let modified = meta.modified().ok().map(DateTime::<Utc>::from);

        Ok(MediaMetadata {
            path: media.path(),
            directory: media.directory,
            name: media.name,
            kind: media.kind,
            size_bytes: meta.len(),
            modified,
            keywords: Vec::new(),
        })
    }

    /// Finds media whose file name contains the query, case-insensitively.
    pub async fn search(&self, query: &SearchQuery) -> AppResult<SearchResult> {
        let needle = query.query.to_lowercase();
        let mut items = Vec::new();
        if needle.is_empty() {
            return Ok(SearchResult { items });
        }

        let mut pending = vec![String::new()];
        while let Some(relative) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(self.root.join(&relative)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().to_string();
                let child = if relative.is_empty() {
                    name.clone()
                } else {
                    format!("{relative}/{name}")
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(child);
                } else if media_kind(&name).is_some() && name.to_lowercase().contains(&needle) {
                    items.push(child);
                    if items.len() >= MAX_SEARCH_RESULTS {
                        debug!(query = %query.query, "Search result limit reached");
                        items.sort();
                        return Ok(SearchResult { items });
                    }
                }
            }
        }

        items.sort();
        Ok(SearchResult { items })
    }
}

#[async_trait]
impl GalleryLookup for FsGallery {
    async fn find_media(&self, path: &str) -> AppResult<Option<MediaRecord>> {
        let (directory, name) = split_media_path(path)?;
        let Some(kind) = media_kind(&name) else {
            return Ok(None);
        };

        let file = self.root.join(path.trim_matches('/'));
        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => Ok(Some(MediaRecord {
                directory,
                name,
                kind,
            })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn can_access(&self, user: &SessionUser, media: &MediaRecord) -> bool {
        let hidden = media.directory.split('/').any(|s| s.starts_with('.'));
        !hidden || user.role.has_at_least(UserRole::Admin)
    }
}

/// Classifies a file by extension.
pub fn media_kind(name: &str) -> Option<MediaKind> {
    let extension = name.rsplit_once('.')?.1.to_lowercase();
    if PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Photo)
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Splits a library path into `(directory, name)`, rejecting traversal.
fn split_media_path(path: &str) -> AppResult<(String, String)> {
    let trimmed = path.trim_matches('/');
    let segments: Vec<&str> = trimmed.split('/').collect();
    let invalid = trimmed.is_empty()
        || trimmed.contains('\\')
        || segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..");
    if invalid {
        return Err(AppError::validation(format!("Invalid media path '{path}'")));
    }

    let (name, directory) = segments
        .split_last()
        .map(|(name, dir)| (name.to_string(), dir.join("/")))
        .ok_or_else(|| AppError::validation(format!("Invalid media path '{path}'")))?;
    Ok((directory, name))
}
