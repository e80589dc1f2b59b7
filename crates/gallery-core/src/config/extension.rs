//! Extension runtime configuration.

use serde::{Deserialize, Serialize};

/// Extension runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionsConfig {
    /// Whether enabled extensions are initialized on startup.
    #[serde(default = "default_true")]
    pub auto_load: bool,
    /// Directory holding one sub-folder per installed extension.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Scratch directory for downloads and archive extraction.
    #[serde(default = "default_scratch")]
    pub scratch_directory: String,
    /// Root of the per-extension private data directories.
    #[serde(default = "default_data_directory")]
    pub data_directory: String,
    /// JSON file persisting per-extension enablement and settings.
    #[serde(default = "default_config_file")]
    pub config_file: String,
    /// Entry-point file that must exist inside an extension folder.
    #[serde(default = "default_entry_file")]
    pub entry_file: String,
    /// Optional manifest carrying the display name and metadata.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// URL (or local path) of the extension catalog.
    #[serde(default)]
    pub catalog_url: Option<String>,
    /// Dependency resolution settings.
    #[serde(default)]
    pub dependencies: DependencyConfig,
    /// Prune storage no longer referenced by any active extension after startup.
    #[serde(default)]
    pub clean_up_unused_storage: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            auto_load: true,
            folder: default_folder(),
            scratch_directory: default_scratch(),
            data_directory: default_data_directory(),
            config_file: default_config_file(),
            entry_file: default_entry_file(),
            manifest_file: default_manifest_file(),
            catalog_url: None,
            dependencies: DependencyConfig::default(),
            clean_up_unused_storage: false,
        }
    }
}

/// How an extension's declared dependencies are resolved before load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyConfig {
    /// Dependency manifest looked up inside the extension folder.
    #[serde(default = "default_dependency_manifest")]
    pub manifest: String,
    /// Directory whose presence marks dependencies as already resolved.
    #[serde(default = "default_resolved_dir")]
    pub resolved_dir: String,
    /// Installer command line, run with the extension folder as working directory.
    #[serde(default = "default_install_command")]
    pub install_command: Vec<String>,
    /// Installer timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            manifest: default_dependency_manifest(),
            resolved_dir: default_resolved_dir(),
            install_command: default_install_command(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_folder() -> String {
    "./extensions".to_string()
}

fn default_scratch() -> String {
    "./data/tmp/extensions".to_string()
}

fn default_data_directory() -> String {
    "./data/extension-data".to_string()
}

fn default_config_file() -> String {
    "./data/extensions.json".to_string()
}

fn default_entry_file() -> String {
    if cfg!(target_os = "windows") {
        "extension.dll".to_string()
    } else if cfg!(target_os = "macos") {
        "libextension.dylib".to_string()
    } else {
        "libextension.so".to_string()
    }
}

fn default_manifest_file() -> String {
    "extension.toml".to_string()
}

fn default_dependency_manifest() -> String {
    "package.json".to_string()
}

fn default_resolved_dir() -> String {
    "node_modules".to_string()
}

fn default_install_command() -> Vec<String> {
    vec![
        "npm".to_string(),
        "install".to_string(),
        "--no-audit".to_string(),
        "--no-fund".to_string(),
    ]
}

fn default_timeout() -> u64 {
    600
}
