//! Sample extension for the gallery server.
//!
//! Tags photo metadata with a configurable keyword, normalizes search
//! queries, exposes `ping` and `greet` operations, adds a "tag" button to
//! media items, and contributes a `log` messenger.

pub mod extension;
pub mod hooks;
pub mod messenger;
pub mod settings;

pub use extension::SampleExtension;
pub use settings::SampleSettings;

#[cfg(feature = "export")]
gallery_extension_sdk::export_extension!(SampleExtension::new());
