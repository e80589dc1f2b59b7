//! Extension context — the capabilities handed to an extension at `init`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::messenger::{ExtensionMessengers, MessengerRepository};
use crate::api::services::{ExtensionConfigHandle, ExtensionEvents, ExtensionLogger};
use crate::api::ui::{ExtensionUi, UiRegistry};
use crate::hooks::registry::HookRegistry;
use crate::routes::binder::ExtensionRouter;
use crate::routes::table::RouteTable;
use crate::store::ExtensionConfigStore;

/// Everything an extension may touch, bound to its unique id.
///
/// Registrations made through these handles are owned by the extension and
/// discarded when it is cleaned up.
#[derive(Clone)]
pub struct ExtensionContext {
    /// Unique id; also the route namespace.
    pub extension_id: String,
    /// Display name.
    pub display_name: String,
    /// Folder the extension was loaded from.
    pub folder: PathBuf,
    /// Private, writable data directory.
    pub data_dir: PathBuf,
    /// Before/after hook registration.
    pub events: ExtensionEvents,
    /// Namespaced route registration.
    pub routes: ExtensionRouter,
    /// Persisted settings.
    pub config: ExtensionConfigHandle,
    /// Logger tagged with the extension id.
    pub logger: ExtensionLogger,
    /// UI contributions.
    pub ui: ExtensionUi,
    /// Messenger registration.
    pub messengers: ExtensionMessengers,
}

impl std::fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("extension_id", &self.extension_id)
            .field("folder", &self.folder)
            .finish_non_exhaustive()
    }
}

/// Shared runtime registries a context writes into.
#[derive(Debug, Clone)]
pub struct ContextServices {
    /// Hook handlers.
    pub hooks: Arc<HookRegistry>,
    /// Extension routes.
    pub routes: Arc<RouteTable>,
    /// UI contributions.
    pub ui: Arc<UiRegistry>,
    /// Messengers.
    pub messengers: Arc<MessengerRepository>,
    /// Persisted settings.
    pub store: Arc<dyn ExtensionConfigStore>,
}

impl ExtensionContext {
    /// Builds the context of one extension.
    pub fn new(
        extension_id: &str,
        display_name: &str,
        folder_name: &str,
        folder: &Path,
        data_dir: &Path,
        services: &ContextServices,
    ) -> Self {
        let router = ExtensionRouter::new(extension_id, services.routes.clone());

        Self {
            extension_id: extension_id.to_string(),
            display_name: display_name.to_string(),
            folder: folder.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
            events: ExtensionEvents::new(extension_id, services.hooks.clone()),
            routes: router.clone(),
            config: ExtensionConfigHandle::new(folder_name, services.store.clone()),
            logger: ExtensionLogger::new(extension_id),
            ui: ExtensionUi::new(extension_id, services.ui.clone(), router),
            messengers: ExtensionMessengers::new(extension_id, services.messengers.clone()),
        }
    }
}
