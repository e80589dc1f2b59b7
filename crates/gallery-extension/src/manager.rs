//! Extension manager — lifecycle management for all extensions.
//!
//! Every operation that touches a folder holds that folder's lock for its
//! whole duration, so install, reload, delete, and enable/disable of one
//! extension never interleave.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use gallery_core::config::extension::ExtensionsConfig;
use gallery_core::error::ErrorKind;
use gallery_core::traits::StorageJanitor;
use gallery_core::{AppError, AppResult};

use crate::api::context::{ContextServices, ExtensionContext};
use crate::api::messenger::MessengerRepository;
use crate::api::ui::UiRegistry;
use crate::hooks::bus::EventBus;
use crate::hooks::registry::HookRegistry;
use crate::installer::{
    self, CatalogClient, DependencyInstaller, ExtensionDescriptor, InstallError,
};
use crate::lifecycle::{ExtensionState, InitOutcome, InitSummary, InstalledExtension, SkipReason};
use crate::loader::ExtensionLoader;
use crate::lock::FolderLocks;
use crate::manifest::ExtensionManifest;
use crate::registry::{ExtensionInstance, ExtensionRegistry};
use crate::routes::table::RouteTable;
use crate::store::{ExtensionConfigEntry, ExtensionConfigStore};

/// Manages install, init, reload, delete, and cleanup of extensions.
pub struct ExtensionManager {
    config: ExtensionsConfig,
    registry: Arc<ExtensionRegistry>,
    hooks: Arc<HookRegistry>,
    bus: EventBus,
    routes: Arc<RouteTable>,
    ui: Arc<UiRegistry>,
    messengers: Arc<MessengerRepository>,
    store: Arc<dyn ExtensionConfigStore>,
    loader: Arc<dyn ExtensionLoader>,
    catalog: Option<Arc<dyn CatalogClient>>,
    janitor: Option<Arc<dyn StorageJanitor>>,
    dependencies: DependencyInstaller,
    locks: FolderLocks,
    states: DashMap<String, ExtensionState>,
}

impl std::fmt::Debug for ExtensionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionManager")
            .field("folder", &self.config.folder)
            .field("loader", &self.loader)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl ExtensionManager {
    /// Creates a manager with fresh registries.
    pub fn new(
        config: ExtensionsConfig,
        store: Arc<dyn ExtensionConfigStore>,
        loader: Arc<dyn ExtensionLoader>,
    ) -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let bus = EventBus::new(hooks.clone());
        let dependencies = DependencyInstaller::new(config.dependencies.clone());

        Self {
            config,
            registry: Arc::new(ExtensionRegistry::new()),
            hooks,
            bus,
            routes: Arc::new(RouteTable::new()),
            ui: Arc::new(UiRegistry::new()),
            messengers: Arc::new(MessengerRepository::new()),
            store,
            loader,
            catalog: None,
            janitor: None,
            dependencies,
            locks: FolderLocks::new(),
            states: DashMap::new(),
        }
    }

    /// Sets the catalog used by `install_from_catalog` and `list_catalog`.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogClient>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets the janitor run after `init_all`.
    pub fn with_janitor(mut self, janitor: Arc<dyn StorageJanitor>) -> Self {
        self.janitor = Some(janitor);
        self
    }

    // ── Bulk ──

    /// Initializes every enabled extension.
    ///
    /// A failing extension is logged and does not stop the others. The
    /// janitor, if any, then runs once with every configured folder, so
    /// disabled or failed extensions keep their data.
    pub async fn init_all(&self) -> AppResult<InitSummary> {
        let entries = self.store.list().await?;
        let mut summary = InitSummary::default();

        for entry in &entries {
            if !entry.enabled {
                self.states
                    .entry(entry.path.clone())
                    .or_insert(ExtensionState::Disabled);
                continue;
            }

            match self.init_single(&entry.path).await {
                Ok(InitOutcome::Initialized { unique_id }) => {
                    summary.initialized.push((entry.path.clone(), unique_id));
                }
                Ok(InitOutcome::Skipped { reason }) => {
                    summary.skipped.push((entry.path.clone(), reason));
                }
                Err(e) => {
                    error!(folder = %entry.path, error = %e, "Extension failed to initialize");
                    summary.failed.push((entry.path.clone(), e.to_string()));
                }
            }
        }

        if let Some(janitor) = &self.janitor {
            let configured: Vec<String> = entries.iter().map(|e| e.path.clone()).collect();
            if let Err(e) = janitor.prune_unreferenced(&configured).await {
                warn!(error = %e, "Extension storage cleanup failed");
            }
        }

        info!(
            initialized = summary.initialized.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "Extensions initialized"
        );
        Ok(summary)
    }

    /// Cleans up every active extension, then resets all registries.
    pub async fn cleanup_all(&self) -> AppResult<()> {
        for instance in self.registry.list().await {
            self.cleanup_single(&instance.unique_id).await?;
        }

        self.hooks.clear().await;
        self.routes.clear().await;
        self.ui.clear().await;
        self.messengers.clear().await;

        info!("All extensions cleaned up");
        Ok(())
    }

    // ── Single extension ──

    /// Initializes the extension in `folder_name`.
    ///
    /// Skips (returns [`InitOutcome::Skipped`]) when the folder has no
    /// config entry, is disabled, or lacks its entry-point file. An `init`
    /// error discards everything the extension registered so far.
    pub async fn init_single(&self, folder_name: &str) -> AppResult<InitOutcome> {
        validate_folder_name(folder_name)?;
        let _guard = self.locks.acquire(folder_name).await;
        self.init_single_locked(folder_name).await
    }

    /// Cleans up the active extension `unique_id`; a no-op when absent.
    ///
    /// The instance is removed even if its `clean_up` fails.
    pub async fn cleanup_single(&self, unique_id: &str) -> AppResult<()> {
        let Some(instance) = self.registry.get(unique_id).await else {
            debug!(extension_id = %unique_id, "Nothing to clean up");
            return Ok(());
        };

        let _guard = self.locks.acquire(&instance.folder_name).await;
        self.cleanup_single_locked(unique_id).await;
        Ok(())
    }

    /// Cleans up and re-initializes the extension loaded from `folder_name`.
    pub async fn reload(&self, folder_name: &str) -> AppResult<InitOutcome> {
        validate_folder_name(folder_name)?;
        let _guard = self.locks.acquire(folder_name).await;

        let Some(instance) = self.registry.find_by_folder(folder_name).await else {
            return Err(match self.store.get(folder_name).await? {
                Some(entry) if !entry.enabled => {
                    AppError::disabled(format!("Extension '{folder_name}' is disabled"))
                }
                _ => AppError::not_found(format!("Extension '{folder_name}' is not loaded")),
            });
        };

        info!(extension_id = %instance.unique_id, folder = %folder_name, "Reloading extension");
        self.cleanup_single_locked(&instance.unique_id).await;
        self.init_single_locked(folder_name).await
    }

    /// Removes an extension: cleanup, folder, and config entry.
    ///
    /// A missing instance or folder is not an error.
    pub async fn delete(&self, folder_name: &str) -> AppResult<()> {
        validate_folder_name(folder_name)?;
        let _guard = self.locks.acquire(folder_name).await;

        if let Some(instance) = self.registry.find_by_folder(folder_name).await {
            self.cleanup_single_locked(&instance.unique_id).await;
        }

        let folder = self.folder_path(folder_name);
        match tokio::fs::remove_dir_all(&folder).await {
            Ok(()) => debug!(path = %folder.display(), "Extension folder removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %folder.display(), "Extension folder already gone");
            }
            Err(e) => return Err(e.into()),
        }

        self.store.remove(folder_name).await?;
        self.states
            .insert(folder_name.to_string(), ExtensionState::Deleted);

        info!(folder = %folder_name, "Extension deleted");
        Ok(())
    }

    /// Persists enablement; enabling initializes, disabling cleans up.
    pub async fn set_enabled(&self, folder_name: &str, enabled: bool) -> AppResult<ExtensionState> {
        validate_folder_name(folder_name)?;
        let _guard = self.locks.acquire(folder_name).await;

        let mut entry = self.store.get(folder_name).await?.ok_or_else(|| {
            AppError::not_found(format!("Extension '{folder_name}' is not installed"))
        })?;

        if entry.enabled != enabled {
            entry.enabled = enabled;
            self.store.upsert(entry).await?;
            info!(folder = %folder_name, enabled, "Extension enablement changed");
        }

        match (enabled, self.registry.find_by_folder(folder_name).await) {
            (true, None) => {
                self.init_single_locked(folder_name).await?;
            }
            (false, Some(instance)) => self.cleanup_single_locked(&instance.unique_id).await,
            _ => {}
        }

        Ok(self.state_of(folder_name).await)
    }

    // ── Catalog ──

    /// Lists the catalog.
    pub async fn list_catalog(&self) -> AppResult<Vec<ExtensionDescriptor>> {
        let catalog = self.catalog.as_ref().ok_or(InstallError::NoCatalog)?;
        catalog.list().await
    }

    /// Downloads, unpacks, registers, and initializes a catalog extension.
    ///
    /// The downloaded archive and extraction area are always removed. A
    /// target folder created by this call is removed again if the install
    /// fails before its config entry is written.
    pub async fn install_from_catalog(&self, id: &str) -> AppResult<InitOutcome> {
        let catalog = self.catalog.clone().ok_or(InstallError::NoCatalog)?;

        let descriptor = catalog
            .list()
            .await?
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| InstallError::NotInCatalog { id: id.to_string() })?;
        let url = descriptor
            .download_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| InstallError::NoDownloadUrl { id: id.to_string() })?;

        let folder_name = descriptor.folder_name.clone();
        validate_folder_name(&folder_name)?;
        let _guard = self.locks.acquire(&folder_name).await;

        info!(id = %id, folder = %folder_name, url = %url, "Installing extension");

        let target = self.folder_path(&folder_name);
        let created = !tokio::fs::try_exists(&target).await.unwrap_or(false);

        let token = Uuid::now_v7().simple().to_string();
        let scratch = PathBuf::from(&self.config.scratch_directory);
        let archive = scratch.join(format!("{token}.zip"));
        let extracted = scratch.join(&token);

        let staged = self
            .stage(catalog.as_ref(), &url, &archive, &extracted, &target)
            .await;
        remove_scratch(&archive, &extracted).await;

        let registered = match staged {
            Ok(()) => self.register_installed(&folder_name).await,
            Err(e) => Err(e),
        };
        if let Err(e) = registered {
            if created {
                if let Err(rm) = tokio::fs::remove_dir_all(&target).await {
                    warn!(path = %target.display(), error = %rm, "Failed to roll back extension folder");
                }
            }
            error!(id = %id, folder = %folder_name, error = %e, "Extension install failed");
            return Err(e);
        }

        if let Some(active) = self.registry.find_by_folder(&folder_name).await {
            self.cleanup_single_locked(&active.unique_id).await;
        }

        let outcome = self.init_single_locked(&folder_name).await?;
        info!(id = %id, folder = %folder_name, "Extension installed");
        Ok(outcome)
    }

    // ── Introspection ──

    /// Config entries joined with their live state.
    pub async fn list_installed(&self) -> AppResult<Vec<InstalledExtension>> {
        let entries = self.store.list().await?;
        let mut out = Vec::with_capacity(entries.len());

        for entry in entries {
            let instance = self.registry.find_by_folder(&entry.path).await;
            let state = match &instance {
                Some(_) => ExtensionState::Active,
                None => self.recorded_state(&entry.path),
            };
            out.push(InstalledExtension {
                state,
                enabled: entry.enabled,
                unique_id: instance.as_ref().map(|i| i.unique_id.clone()),
                display_name: instance.as_ref().map(|i| i.display_name.clone()),
                loaded_at: instance.as_ref().map(|i| i.loaded_at),
                folder_name: entry.path,
            });
        }
        Ok(out)
    }

    /// Current state of `folder_name`.
    pub async fn state_of(&self, folder_name: &str) -> ExtensionState {
        if self.registry.find_by_folder(folder_name).await.is_some() {
            return ExtensionState::Active;
        }
        self.recorded_state(folder_name)
    }

    /// Event bus core subsystems trigger hook points through.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Hook registry.
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Extension route table.
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// UI contributions.
    pub fn ui(&self) -> &Arc<UiRegistry> {
        &self.ui
    }

    /// Messengers.
    pub fn messengers(&self) -> &Arc<MessengerRepository> {
        &self.messengers
    }

    /// Active extensions.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    /// Runtime configuration.
    pub fn config(&self) -> &ExtensionsConfig {
        &self.config
    }

    // ── Internals (caller holds the folder lock) ──

    async fn init_single_locked(&self, folder_name: &str) -> AppResult<InitOutcome> {
        let Some(entry) = self.store.get(folder_name).await? else {
            info!(folder = %folder_name, "Extension has no config entry, skipping");
            self.set_state(folder_name, ExtensionState::Unconfigured);
            return Ok(InitOutcome::Skipped {
                reason: SkipReason::NotConfigured,
            });
        };

        if !entry.enabled {
            info!(folder = %folder_name, "Extension is disabled, skipping");
            self.set_state(folder_name, ExtensionState::Disabled);
            return Ok(InitOutcome::Skipped {
                reason: SkipReason::Disabled,
            });
        }

        let folder = self.folder_path(folder_name);
        let entry_file = self.entry_path(folder_name);
        if !tokio::fs::try_exists(&entry_file).await.unwrap_or(false) {
            warn!(
                folder = %folder_name,
                entry = %entry_file.display(),
                "Extension entry point missing, skipping"
            );
            self.set_state(folder_name, ExtensionState::Disabled);
            return Ok(InitOutcome::Skipped {
                reason: SkipReason::MissingEntryPoint,
            });
        }

        if let Some(active) = self.registry.find_by_folder(folder_name).await {
            return Err(AppError::conflict(format!(
                "Extension folder '{folder_name}' is already active as '{}'",
                active.unique_id
            )));
        }

        self.set_state(folder_name, ExtensionState::Loading);
        match self.activate(folder_name, &folder, &entry_file).await {
            Ok(unique_id) => {
                self.set_state(folder_name, ExtensionState::Active);
                Ok(InitOutcome::Initialized { unique_id })
            }
            Err(e) => {
                self.set_state(folder_name, ExtensionState::Failed);
                Err(e)
            }
        }
    }

    async fn activate(&self, folder_name: &str, folder: &Path, entry_file: &Path) -> AppResult<String> {
        if self.dependencies.needs_install(folder).await {
            self.dependencies.install(folder).await?;
        }

        let manifest = ExtensionManifest::read(folder, &self.config.manifest_file)
            .await?
            .unwrap_or_default();
        let display_name = manifest.display_name(folder_name);

        let extension = self.loader.load(folder_name, folder, entry_file).await?;

        let data_dir = self.data_path(folder_name);
        tokio::fs::create_dir_all(&data_dir).await?;

        let unique_id = self.registry.reserve(&display_name, folder_name).await?;
        let context = ExtensionContext::new(
            &unique_id,
            &display_name,
            folder_name,
            folder,
            &data_dir,
            &self.context_services(),
        );

        debug!(extension_id = %unique_id, folder = %folder_name, "Calling extension init");
        if let Err(e) = extension.init(&context).await {
            self.discard_registrations(&unique_id).await;
            self.registry.release(&unique_id).await;
            return Err(AppError::with_source(
                ErrorKind::Plugin,
                format!("Extension '{unique_id}' failed to initialize: {}", e.message),
                e,
            ));
        }

        self.registry
            .activate(ExtensionInstance {
                unique_id: unique_id.clone(),
                display_name,
                folder_name: folder_name.to_string(),
                extension,
                context,
                loaded_at: chrono::Utc::now(),
            })
            .await?;
        Ok(unique_id)
    }

    async fn cleanup_single_locked(&self, unique_id: &str) {
        let Some(instance) = self.registry.get(unique_id).await else {
            return;
        };
        let folder_name = instance.folder_name.clone();
        self.set_state(&folder_name, ExtensionState::Unloading);

        let entry_file = self.entry_path(&folder_name);
        if tokio::fs::try_exists(&entry_file).await.unwrap_or(false) {
            if let Err(e) = instance.extension.clean_up(&instance.context).await {
                warn!(extension_id = %unique_id, error = %e, "Extension clean_up failed");
            }
        } else {
            debug!(extension_id = %unique_id, "Entry point gone, skipping clean_up");
        }

        self.discard_registrations(unique_id).await;
        self.registry.remove(unique_id).await;

        let state = match self.store.get(&folder_name).await {
            Ok(None) => ExtensionState::Unconfigured,
            _ => ExtensionState::Disabled,
        };
        self.set_state(&folder_name, state);

        info!(extension_id = %unique_id, folder = %folder_name, "Extension cleaned up");
    }

    async fn discard_registrations(&self, unique_id: &str) {
        let hooks = self.hooks.unregister_owner(unique_id).await;
        let routes = self.routes.remove_owner(unique_id).await;
        let buttons = self.ui.remove_owner(unique_id).await;
        let messengers = self.messengers.unregister_owner(unique_id).await;

        debug!(
            extension_id = %unique_id,
            hooks,
            routes,
            buttons,
            messengers,
            "Extension registrations discarded"
        );
    }

    async fn stage(
        &self,
        catalog: &dyn CatalogClient,
        url: &str,
        archive: &Path,
        extracted: &Path,
        target: &Path,
    ) -> AppResult<()> {
        catalog.download(url, archive).await?;
        tokio::fs::create_dir_all(target).await?;

        let (archive, extracted, target) =
            (archive.to_path_buf(), extracted.to_path_buf(), target.to_path_buf());
        let moved = tokio::task::spawn_blocking(move || -> Result<usize, InstallError> {
            installer::extract_archive(&archive, &extracted)?;
            installer::flatten_into(&extracted, &target)
        })
        .await
        .map_err(InstallError::from)??;

        debug!(entries = moved, "Extension archive staged");
        Ok(())
    }

    async fn register_installed(&self, folder_name: &str) -> AppResult<()> {
        let configs = self
            .store
            .get(folder_name)
            .await?
            .map(|e| e.configs)
            .unwrap_or(Value::Null);

        self.store
            .upsert(ExtensionConfigEntry {
                configs,
                ..ExtensionConfigEntry::enabled(folder_name)
            })
            .await
    }

    fn context_services(&self) -> ContextServices {
        ContextServices {
            hooks: self.hooks.clone(),
            routes: self.routes.clone(),
            ui: self.ui.clone(),
            messengers: self.messengers.clone(),
            store: self.store.clone(),
        }
    }

    fn set_state(&self, folder_name: &str, state: ExtensionState) {
        self.states.insert(folder_name.to_string(), state);
    }

    fn recorded_state(&self, folder_name: &str) -> ExtensionState {
        self.states
            .get(folder_name)
            .map(|s| *s)
            .unwrap_or(ExtensionState::Disabled)
    }

    fn folder_path(&self, folder_name: &str) -> PathBuf {
        Path::new(&self.config.folder).join(folder_name)
    }

    fn entry_path(&self, folder_name: &str) -> PathBuf {
        self.folder_path(folder_name).join(&self.config.entry_file)
    }

    fn data_path(&self, folder_name: &str) -> PathBuf {
        Path::new(&self.config.data_directory).join(folder_name)
    }
}

/// Folder names are single path segments.
fn validate_folder_name(folder_name: &str) -> AppResult<()> {
    let invalid = folder_name.trim().is_empty()
        || folder_name == "."
        || folder_name == ".."
        || folder_name.contains(['/', '\\']);
    if invalid {
        return Err(AppError::validation(format!(
            "Invalid extension folder name '{folder_name}'"
        )));
    }
    Ok(())
}

async fn remove_scratch(archive: &Path, extracted: &Path) {
    if let Err(e) = tokio::fs::remove_file(archive).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %archive.display(), error = %e, "Failed to remove downloaded archive");
        }
    }
    if let Err(e) = tokio::fs::remove_dir_all(extracted).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %extracted.display(), error = %e, "Failed to remove extraction area");
        }
    }
}
