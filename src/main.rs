//! Gallery Server — self-hosted photo gallery with an extension runtime
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use gallery_core::AppError;
use gallery_core::config::AppConfig;
use gallery_extension::extension::Extension;
use gallery_extension::loader::{BuiltinLoader, ExtensionLoader};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `GALLERY_CONFIG_DIR` (default `config`) and
/// the `GALLERY_ENV` overlay
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("GALLERY_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("GALLERY_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Extensions compiled into the server, plus the shared-library loader
/// when built with the `dynamic` feature
fn extension_loader(config: &AppConfig) -> Arc<dyn ExtensionLoader> {
    let loader = BuiltinLoader::new().with("sample", || {
        Arc::new(extension_sample::SampleExtension::new()) as Arc<dyn Extension>
    });

    #[cfg(feature = "dynamic")]
    let loader = loader.with_fallback(Arc::new(gallery_extension::loader::DynamicLoader::new(
        std::path::Path::new(&config.extensions.scratch_directory).join("libraries"),
    )));
    #[cfg(not(feature = "dynamic"))]
    let _ = config;

    Arc::new(loader)
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gallery Server v{}", env!("CARGO_PKG_VERSION"));

    let loader = extension_loader(&config);
    let state = gallery_api::build_state(config.clone(), loader).await?;

    // ── Extensions ───────────────────────────────────────────────
    if config.extensions.auto_load {
        let summary = state.extensions.init_all().await?;
        for (folder, error) in &summary.failed {
            tracing::warn!(folder = %folder, error = %error, "Extension left inactive");
        }
    } else {
        tracing::info!("Extension auto-load disabled");
    }

    let extensions = state.extensions.clone();
    let app = gallery_api::build_app(state);

    // ── HTTP server ──────────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Gallery server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Extension cleanup ────────────────────────────────────────
    let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
    match tokio::time::timeout(grace, extensions.cleanup_all()).await {
        Ok(result) => result?,
        Err(_) => tracing::warn!("Extension cleanup did not finish within the grace period"),
    }

    tracing::info!("Gallery server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
