//! Host services the extension runtime reaches through `gallery-core` traits.

pub mod auth;
pub mod cache;
pub mod gallery;

pub use auth::ConfigAuthenticator;
pub use cache::LoggingCacheInvalidator;
pub use gallery::FsGallery;
