//! Route definitions for the gallery HTTP API.
//!
//! Host endpoints are mounted under `/api`; extension-contributed routes
//! are served under `/extension` through the live route table.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{any, delete, get, post, put},
};

use gallery_extension::routes::EXTENSION_API_PREFIX;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the request-logging layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(gallery_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(extension_routes())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Gallery endpoints running through the hook chain
fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/gallery/metadata", get(handlers::gallery::media_metadata))
        .route("/gallery/search", get(handlers::gallery::search))
        .route("/gallery/buttons", get(handlers::gallery::media_buttons))
}

/// Admin extension management
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/extensions",
            get(handlers::admin::extensions::list_installed),
        )
        .route(
            "/admin/extensions/catalog",
            get(handlers::admin::extensions::list_catalog),
        )
        .route(
            "/admin/extensions/install",
            post(handlers::admin::extensions::install),
        )
        .route(
            "/admin/extensions/routes",
            get(handlers::admin::extensions::list_routes),
        )
        .route(
            "/admin/extensions/hooks",
            get(handlers::admin::extensions::list_hooks),
        )
        .route(
            "/admin/extensions/messengers/{name}",
            post(handlers::admin::extensions::send_message),
        )
        .route(
            "/admin/extensions/{folder}",
            delete(handlers::admin::extensions::delete),
        )
        .route(
            "/admin/extensions/{folder}/reload",
            post(handlers::admin::extensions::reload),
        )
        .route(
            "/admin/extensions/{folder}/enabled",
            put(handlers::admin::extensions::set_enabled),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Catch-all for extension-contributed routes
fn extension_routes() -> Router<AppState> {
    Router::new().route(
        &format!("{EXTENSION_API_PREFIX}/{{*path}}"),
        any(handlers::extension::dispatch),
    )
}
