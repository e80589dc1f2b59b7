//! Application builder — wires router + middleware + state into an Axum app.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::trace::TraceLayer;

use gallery_core::AppResult;
use gallery_core::config::AppConfig;
use gallery_extension::installer::HttpCatalogClient;
use gallery_extension::janitor::DataDirectoryJanitor;
use gallery_extension::loader::ExtensionLoader;
use gallery_extension::manager::ExtensionManager;
use gallery_extension::routes::HostServices;
use gallery_extension::store::JsonFileConfigStore;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::services::{ConfigAuthenticator, FsGallery, LoggingCacheInvalidator};
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Builds the application state: host services and the extension runtime.
///
/// Extensions are not initialized here; call
/// [`ExtensionManager::init_all`] once the state is built.
pub async fn build_state(config: AppConfig, loader: Arc<dyn ExtensionLoader>) -> AppResult<AppState> {
    let extensions_config = &config.extensions;
    for dir in [
        &extensions_config.folder,
        &extensions_config.scratch_directory,
        &extensions_config.data_directory,
    ] {
        tokio::fs::create_dir_all(dir).await?;
    }

    let store = Arc::new(JsonFileConfigStore::open(&extensions_config.config_file).await?);
    let mut manager = ExtensionManager::new(extensions_config.clone(), store, loader);

    if let Some(url) = &extensions_config.catalog_url {
        manager = manager.with_catalog(Arc::new(HttpCatalogClient::new(url.clone())?));
    }
    if extensions_config.clean_up_unused_storage {
        manager = manager.with_janitor(Arc::new(DataDirectoryJanitor::new(
            &extensions_config.data_directory,
        )));
    }

    let gallery = Arc::new(FsGallery::new(&config.gallery.root));
    let host = HostServices {
        authenticator: Arc::new(ConfigAuthenticator::new(&config.auth)),
        gallery: gallery.clone(),
        cache: Arc::new(LoggingCacheInvalidator),
    };

    tracing::info!(
        folder = %extensions_config.folder,
        catalog = ?extensions_config.catalog_url,
        "Extension runtime configured"
    );

    Ok(AppState {
        config: Arc::new(config),
        extensions: Arc::new(manager),
        host,
        gallery,
        started_at: Instant::now(),
    })
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use gallery_core::config::extension::ExtensionsConfig;
    use gallery_extension::loader::BuiltinLoader;
    use tower::ServiceExt;

    use super::*;

    async fn state(root: &std::path::Path) -> AppState {
        let path = |name: &str| root.join(name).display().to_string();
        let config = AppConfig {
            extensions: ExtensionsConfig {
                folder: path("extensions"),
                scratch_directory: path("scratch"),
                data_directory: path("data"),
                config_file: path("extensions.json"),
                ..ExtensionsConfig::default()
            },
            ..AppConfig::default()
        };
        build_state(config, Arc::new(BuiltinLoader::new()))
            .await
            .expect("state")
    }

    #[tokio::test]
    async fn test_build_state_creates_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let _state = state(dir.path()).await;

        for name in ["extensions", "scratch", "data"] {
            assert!(dir.path().join(name).is_dir(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_health_reports_no_active_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(state(dir.path()).await);

        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["active_extensions"], 0);
    }

    #[tokio::test]
    async fn test_extension_prefix_without_routes_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(state(dir.path()).await);

        let response = app
            .oneshot(
                Request::get("/extension/Nobody/ping")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
