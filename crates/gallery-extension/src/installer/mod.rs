//! Installation plumbing — catalog access, archive handling, dependencies.

pub mod archive;
pub mod catalog;
pub mod dependencies;
pub mod error;

pub use archive::{extract_archive, flatten_into};
pub use catalog::{CatalogClient, ExtensionDescriptor, HttpCatalogClient};
pub use dependencies::DependencyInstaller;
pub use error::InstallError;
