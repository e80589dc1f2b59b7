//! Admin extension management handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use gallery_core::AppError;
use gallery_extension::api::messenger::Message;
use gallery_extension::hooks::HookRegistration;
use gallery_extension::installer::ExtensionDescriptor;
use gallery_extension::lifecycle::{InitOutcome, InstalledExtension};
use gallery_extension::routes::RouteInfo;

use crate::dto::request::{InstallExtensionRequest, SetEnabledRequest, validate};
use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/extensions
pub async fn list_installed(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<InstalledExtension>>>, AppError> {
    require_admin(&auth)?;
    let installed = state.extensions.list_installed().await?;
    Ok(Json(ApiResponse::ok(installed)))
}

/// GET /api/admin/extensions/catalog
pub async fn list_catalog(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ExtensionDescriptor>>>, AppError> {
    require_admin(&auth)?;
    let catalog = state.extensions.list_catalog().await?;
    Ok(Json(ApiResponse::ok(catalog)))
}

/// POST /api/admin/extensions/install
pub async fn install(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<InstallExtensionRequest>,
) -> Result<Json<ApiResponse<InitOutcome>>, AppError> {
    require_admin(&auth)?;
    validate(&req)?;
    tracing::info!(id = %req.id, user = %auth.username, "Extension install requested");
    let outcome = state.extensions.install_from_catalog(&req.id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// POST /api/admin/extensions/{folder}/reload
pub async fn reload(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder): Path<String>,
) -> Result<Json<ApiResponse<InitOutcome>>, AppError> {
    require_admin(&auth)?;
    let outcome = state.extensions.reload(&folder).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// PUT /api/admin/extensions/{folder}/enabled
pub async fn set_enabled(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    require_admin(&auth)?;
    let extension_state = state.extensions.set_enabled(&folder, req.enabled).await?;
    Ok(Json(ApiResponse::ok(json!({
        "folder": folder,
        "enabled": req.enabled,
        "state": extension_state,
    }))))
}

/// DELETE /api/admin/extensions/{folder}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder): Path<String>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    require_admin(&auth)?;
    state.extensions.delete(&folder).await?;
    Ok(Json(ApiResponse::ok(json!({ "deleted": folder }))))
}

/// GET /api/admin/extensions/routes
pub async fn list_routes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<RouteInfo>>>, AppError> {
    require_admin(&auth)?;
    Ok(Json(ApiResponse::ok(state.extensions.routes().list().await)))
}

/// GET /api/admin/extensions/hooks
pub async fn list_hooks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<HookRegistration>>>, AppError> {
    require_admin(&auth)?;
    Ok(Json(ApiResponse::ok(
        state.extensions.hooks().registrations().await,
    )))
}

/// POST /api/admin/extensions/messengers/{name}
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
    Json(message): Json<Message>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    require_admin(&auth)?;
    state.extensions.messengers().send(&name, &message).await?;
    Ok(Json(ApiResponse::ok(json!({ "sent": name }))))
}
