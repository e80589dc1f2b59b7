//! Core traits defined in `gallery-core` and implemented by other crates.
//!
//! These are the narrow contracts through which the extension runtime
//! reaches host subsystems it does not own.

pub mod auth;
pub mod gallery;

pub use auth::Authenticator;
pub use gallery::{CacheInvalidator, GalleryLookup, StorageJanitor};
