//! Extension loaders — turn an extension folder into a live [`Extension`].
//!
//! [`BuiltinLoader`] serves extensions compiled into the host, keyed by
//! folder name. With the `dynamic` feature, [`DynamicLoader`] loads the
//! entry file as a shared library built with the SDK's `export_extension!`.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use gallery_core::{AppError, AppResult};

use crate::extension::Extension;

/// ABI version an extension library must report to be loaded.
pub const EXTENSION_ABI_VERSION: u32 = 1;

/// Symbol returning the library's ABI version.
pub const ABI_VERSION_SYMBOL: &[u8] = b"gallery_extension_abi_version";

/// Symbol constructing the library's extension.
pub const CREATE_SYMBOL: &[u8] = b"gallery_extension_create";

/// Produces the extension of one folder.
#[async_trait]
pub trait ExtensionLoader: Send + Sync + std::fmt::Debug {
    /// Loads the extension in `folder`, whose entry file is `entry`.
    async fn load(&self, folder_name: &str, folder: &Path, entry: &Path) -> AppResult<Arc<dyn Extension>>;
}

/// Constructor of a compiled-in extension.
pub type ExtensionFactory = Arc<dyn Fn() -> Arc<dyn Extension> + Send + Sync>;

/// Loader for extensions compiled into the host.
#[derive(Default)]
pub struct BuiltinLoader {
    factories: HashMap<String, ExtensionFactory>,
    fallback: Option<Arc<dyn ExtensionLoader>>,
}

impl std::fmt::Debug for BuiltinLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut folders: Vec<_> = self.factories.keys().collect();
        folders.sort();
        f.debug_struct("BuiltinLoader")
            .field("folders", &folders)
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl BuiltinLoader {
    /// Creates a loader with no built-in extensions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory of the extension installed in `folder_name`.
    pub fn with<F>(mut self, folder_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Extension> + Send + Sync + 'static,
    {
        self.factories.insert(folder_name.into(), Arc::new(factory));
        self
    }

    /// Loader for folders with no built-in factory.
    pub fn with_fallback(mut self, fallback: Arc<dyn ExtensionLoader>) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl ExtensionLoader for BuiltinLoader {
    async fn load(&self, folder_name: &str, folder: &Path, entry: &Path) -> AppResult<Arc<dyn Extension>> {
        if let Some(factory) = self.factories.get(folder_name) {
            debug!(folder = %folder_name, "Loading built-in extension");
            return Ok(factory());
        }

        match &self.fallback {
            Some(fallback) => fallback.load(folder_name, folder, entry).await,
            None => Err(AppError::plugin(format!(
                "No loader available for extension folder '{folder_name}'"
            ))),
        }
    }
}

#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use tracing::info;
    use uuid::Uuid;

    use gallery_core::{AppError, AppResult};

    use super::{ABI_VERSION_SYMBOL, CREATE_SYMBOL, EXTENSION_ABI_VERSION, ExtensionLoader};
    use crate::extension::Extension;

    /// Signature of the ABI version export.
    pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

    /// Signature of the constructor export.
    pub type CreateExtensionFn = unsafe extern "Rust" fn() -> Box<dyn Extension>;

    /// Loads extensions from shared libraries (.so / .dll / .dylib).
    ///
    /// Each load copies the library to a unique shadow path first so a
    /// reload picks up a rebuilt file. Libraries are never unloaded; their
    /// code may still be referenced by in-flight handlers.
    pub struct DynamicLoader {
        shadow_dir: PathBuf,
        libraries: Mutex<Vec<libloading::Library>>,
    }

    impl DynamicLoader {
        /// Creates a loader shadow-copying libraries into `shadow_dir`.
        pub fn new(shadow_dir: impl Into<PathBuf>) -> Self {
            Self {
                shadow_dir: shadow_dir.into(),
                libraries: Mutex::new(Vec::new()),
            }
        }

        async fn shadow_copy(&self, entry: &Path) -> AppResult<PathBuf> {
            tokio::fs::create_dir_all(&self.shadow_dir).await?;
            let file_name = entry
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "extension".to_string());
            let shadow = self
                .shadow_dir
                .join(format!("{}-{file_name}", Uuid::now_v7().simple()));
            tokio::fs::copy(entry, &shadow).await?;
            Ok(shadow)
        }

        /// # Safety
        /// Runs arbitrary code from the library. Only load trusted extensions
        /// built against the same SDK and compiler.
        unsafe fn open(&self, path: &Path) -> AppResult<Box<dyn Extension>> {
            // SAFETY: upheld by the caller.
            let library = unsafe { libloading::Library::new(path) }.map_err(|e| {
                AppError::plugin(format!(
                    "Failed to load extension library '{}': {e}",
                    path.display()
                ))
            })?;

            // SAFETY: symbol types are fixed by `export_extension!`.
            let extension = unsafe {
                let version: libloading::Symbol<AbiVersionFn> =
                    library.get(ABI_VERSION_SYMBOL).map_err(|e| {
                        AppError::plugin(format!(
                            "Extension library '{}' has no ABI version: {e}",
                            path.display()
                        ))
                    })?;
                let found = version();
                if found != EXTENSION_ABI_VERSION {
                    return Err(AppError::plugin(format!(
                        "Extension library '{}' has ABI version {found}, expected {EXTENSION_ABI_VERSION}",
                        path.display()
                    )));
                }

                let create: libloading::Symbol<CreateExtensionFn> =
                    library.get(CREATE_SYMBOL).map_err(|e| {
                        AppError::plugin(format!(
                            "Extension library '{}' has no constructor: {e}",
                            path.display()
                        ))
                    })?;
                create()
            };

            self.libraries
                .lock()
                .map_err(|_| AppError::internal("Extension library list poisoned"))?
                .push(library);
            Ok(extension)
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let loaded = self.libraries.lock().map(|l| l.len()).unwrap_or(0);
            f.debug_struct("DynamicLoader")
                .field("shadow_dir", &self.shadow_dir)
                .field("loaded_count", &loaded)
                .finish()
        }
    }

    #[async_trait]
    impl ExtensionLoader for DynamicLoader {
        async fn load(
            &self,
            folder_name: &str,
            _folder: &Path,
            entry: &Path,
        ) -> AppResult<Arc<dyn Extension>> {
            let shadow = self.shadow_copy(entry).await?;

            // SAFETY: extension folders are installed by administrators.
            let extension = unsafe { self.open(&shadow) }?;

            info!(
                folder = %folder_name,
                library = %shadow.display(),
                "Dynamic extension loaded"
            );
            Ok(Arc::from(extension))
        }
    }
}

#[cfg(feature = "dynamic")]
pub use dynamic_loader::DynamicLoader;
