//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use gallery_core::config::AppConfig;
use gallery_extension::manager::ExtensionManager;
use gallery_extension::routes::HostServices;

use crate::services::gallery::FsGallery;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Extension runtime
    pub extensions: Arc<ExtensionManager>,
    /// Host collaborators handed to extension routes
    pub host: HostServices,
    /// Media library
    pub gallery: Arc<FsGallery>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}
