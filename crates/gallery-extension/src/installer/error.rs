//! Error type for catalog, download, extraction, and dependency steps.

use thiserror::Error;

use gallery_core::AppError;
use gallery_core::error::ErrorKind;

/// Failures while installing an extension.
#[derive(Debug, Error)]
pub enum InstallError {
    // --- Catalog ---
    /// No catalog is configured.
    #[error("No extension catalog is configured")]
    NoCatalog,

    /// The catalog has no entry with this id.
    #[error("Extension '{id}' not found in catalog")]
    NotInCatalog {
        /// Requested catalog id.
        id: String,
    },

    /// The catalog entry carries no download location.
    #[error("Extension '{id}' has no download url")]
    NoDownloadUrl {
        /// Catalog id.
        id: String,
    },

    /// Fetching the catalog failed.
    #[error("Catalog at '{location}' unavailable: {reason}")]
    Catalog {
        /// Catalog URL or path.
        location: String,
        /// What went wrong.
        reason: String,
    },

    // --- Download ---
    /// Downloading the archive failed.
    #[error("Download of '{url}' failed: {reason}")]
    Download {
        /// Archive URL or path.
        url: String,
        /// What went wrong.
        reason: String,
    },

    // --- Archive ---
    /// The archive contains too many entries.
    #[error("Archive contains {count} entries, exceeding limit of {limit}")]
    TooManyEntries {
        /// Entries in the archive.
        count: usize,
        /// Maximum allowed.
        limit: usize,
    },

    /// Extraction exceeded the size limit.
    #[error("Archive extraction exceeded {limit} byte size limit")]
    SizeExceeded {
        /// Maximum allowed bytes.
        limit: u64,
    },

    /// The archive extracted to nothing.
    #[error("Archive is empty")]
    EmptyArchive,

    /// ZIP library error.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // --- Dependencies ---
    /// The dependency installer could not be started.
    #[error("Dependency installer '{command}' could not start: {reason}")]
    InstallerNotStarted {
        /// Program name.
        command: String,
        /// What went wrong.
        reason: String,
    },

    /// The dependency installer exited unsuccessfully.
    #[error("Dependency installer exited with code {code}: {stderr}")]
    DependenciesFailed {
        /// Exit code, `-1` when killed by a signal.
        code: i32,
        /// Captured stderr, truncated.
        stderr: String,
    },

    /// The dependency installer ran too long.
    #[error("Dependency installer timed out after {timeout_seconds}s")]
    DependencyTimeout {
        /// The exceeded timeout.
        timeout_seconds: u64,
    },

    // --- Generic ---
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<InstallError> for AppError {
    fn from(err: InstallError) -> Self {
        let kind = match &err {
            InstallError::NoCatalog => ErrorKind::Configuration,
            InstallError::NotInCatalog { .. } => ErrorKind::NotFound,
            InstallError::NoDownloadUrl { .. }
            | InstallError::TooManyEntries { .. }
            | InstallError::SizeExceeded { .. }
            | InstallError::EmptyArchive
            | InstallError::Zip(_) => ErrorKind::Validation,
            InstallError::Catalog { .. } | InstallError::Download { .. } => {
                ErrorKind::ExternalService
            }
            InstallError::InstallerNotStarted { .. }
            | InstallError::DependenciesFailed { .. }
            | InstallError::DependencyTimeout { .. } => ErrorKind::Plugin,
            InstallError::Io(_) => ErrorKind::Storage,
            InstallError::Join(_) => ErrorKind::Internal,
        };
        let message = err.to_string();
        AppError::with_source(kind, message, err)
    }
}
