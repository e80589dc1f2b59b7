//! Test doubles for the host collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use gallery_core::traits::{Authenticator, CacheInvalidator, GalleryLookup};
use gallery_core::types::{MediaKind, MediaRecord, SessionUser, UserRole};
use gallery_core::{AppError, AppResult};

use super::guard::HostServices;

/// Accepts `guest-token`, `user-token` and `admin-token`.
#[derive(Debug, Default)]
pub struct StaticAuthenticator;

#[async_trait]
impl Authenticator for StaticAuthenticator {
    async fn authenticate(&self, bearer_token: Option<&str>) -> AppResult<SessionUser> {
        match bearer_token {
            Some("guest-token") => Ok(SessionUser::new("guest", UserRole::Guest)),
            Some("user-token") => Ok(SessionUser::new("alice", UserRole::User)),
            Some("admin-token") => Ok(SessionUser::new("root", UserRole::Admin)),
            Some(_) => Err(AppError::unauthorized("Unknown token")),
            None => Err(AppError::unauthorized("Authentication required")),
        }
    }
}

/// Knows `trips/beach.jpg` (everyone) and `private/secret.jpg` (admins only).
#[derive(Debug, Default)]
pub struct StaticGallery;

#[async_trait]
impl GalleryLookup for StaticGallery {
    async fn find_media(&self, path: &str) -> AppResult<Option<MediaRecord>> {
        let record = match path {
            "trips/beach.jpg" => MediaRecord {
                directory: "trips".into(),
                name: "beach.jpg".into(),
                kind: MediaKind::Photo,
            },
            "private/secret.jpg" => MediaRecord {
                directory: "private".into(),
                name: "secret.jpg".into(),
                kind: MediaKind::Photo,
            },
            _ => return Ok(None),
        };
        Ok(Some(record))
    }

    fn can_access(&self, user: &SessionUser, media: &MediaRecord) -> bool {
        media.directory != "private" || user.role.has_at_least(UserRole::Admin)
    }
}

/// Records invalidated directories.
#[derive(Debug, Default)]
pub struct RecordingCache {
    pub invalidated: Mutex<Vec<String>>,
}

#[async_trait]
impl CacheInvalidator for RecordingCache {
    async fn invalidate_directory(&self, directory: &str) -> AppResult<()> {
        self.invalidated
            .lock()
            .map_err(|_| AppError::internal("poisoned"))?
            .push(directory.to_string());
        Ok(())
    }
}

/// Host services built from the doubles above; returns the cache for asserts.
pub fn host_services() -> (HostServices, Arc<RecordingCache>) {
    let cache = Arc::new(RecordingCache::default());
    let host = HostServices {
        authenticator: Arc::new(StaticAuthenticator),
        gallery: Arc::new(StaticGallery),
        cache: cache.clone(),
    };
    (host, cache)
}
