//! Gallery-side contracts consumed by the extension runtime.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{MediaRecord, SessionUser};

/// Looks up media items in the gallery.
#[async_trait]
pub trait GalleryLookup: Send + Sync + std::fmt::Debug {
    /// Resolves a library-relative media path to its record.
    async fn find_media(&self, path: &str) -> AppResult<Option<MediaRecord>>;

    /// Whether `user` may access `media`.
    fn can_access(&self, user: &SessionUser, media: &MediaRecord) -> bool;
}

/// Invalidates cached gallery projections.
#[async_trait]
pub trait CacheInvalidator: Send + Sync + std::fmt::Debug {
    /// Drops cached listings of a library-relative directory.
    async fn invalidate_directory(&self, directory: &str) -> AppResult<()>;
}

/// Prunes storage left behind by extensions that are no longer installed.
#[async_trait]
pub trait StorageJanitor: Send + Sync + std::fmt::Debug {
    /// Removes storage not referenced by any of `kept_folders`.
    async fn prune_unreferenced(&self, kept_folders: &[String]) -> AppResult<()>;
}
