//! Gallery handlers whose operations run through the extension hook chain.

use axum::Json;
use axum::extract::{Query, State};

use gallery_core::AppError;
use gallery_core::traits::GalleryLookup;
use gallery_core::types::MediaKind;
use gallery_extension::api::ui::MediaButton;
use gallery_extension::hooks::HookPoint;

use crate::dto::request::{MediaPathQuery, SearchQuery, validate};
use crate::dto::response::{ApiResponse, MediaMetadata, SearchResult};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/gallery/metadata?path=
///
/// Triggers `load_photo_metadata` or `load_video_metadata` depending on the
/// media kind.
pub async fn media_metadata(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MediaPathQuery>,
) -> Result<Json<ApiResponse<MediaMetadata>>, AppError> {
    validate(&query)?;

    let media = state
        .gallery
        .find_media(&query.path)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Media '{}' not found", query.path)))?;
    if !state.gallery.can_access(&auth, &media) {
        return Err(AppError::forbidden("Media not accessible"));
    }

    let hook = match media.kind {
        MediaKind::Photo => HookPoint::LoadPhotoMetadata,
        MediaKind::Video => HookPoint::LoadVideoMetadata,
    };
    let gallery = state.gallery.clone();
    let metadata = state
        .extensions
        .bus()
        .trigger(&hook, query, |input: MediaPathQuery| async move {
            gallery.load_metadata(&input.path).await
        })
        .await?;

    Ok(Json(ApiResponse::ok(metadata)))
}

/// GET /api/gallery/search?query=
///
/// Hits the caller cannot access are dropped after the hook chain ran.
pub async fn search(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResult>>, AppError> {
    validate(&query)?;

    let gallery = state.gallery.clone();
    let result: SearchResult = state
        .extensions
        .bus()
        .trigger(&HookPoint::Search, query, |input: SearchQuery| async move {
            gallery.search(&input).await
        })
        .await?;

    let mut items = Vec::with_capacity(result.items.len());
    for path in result.items {
        if let Ok(Some(media)) = state.gallery.find_media(&path).await {
            if state.gallery.can_access(&auth, &media) {
                items.push(path);
            }
        }
    }

    Ok(Json(ApiResponse::ok(SearchResult { items })))
}

/// GET /api/gallery/buttons
pub async fn media_buttons(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<MediaButton>>>, AppError> {
    let buttons = state.extensions.ui().media_buttons_for(auth.role).await;
    Ok(Json(ApiResponse::ok(buttons)))
}
