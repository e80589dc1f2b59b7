//! The trait every extension implements.

use async_trait::async_trait;

use gallery_core::AppResult;

use crate::api::context::ExtensionContext;

/// An installable unit of third-party code.
///
/// `init` runs once per activation with a context bound to the extension's
/// unique id; everything the extension registers through that context is
/// owned by it and removed when the extension is cleaned up. `clean_up` runs
/// before the extension is dropped, as long as its entry-point file is still
/// present on disk.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Called once when the extension is activated.
    async fn init(&self, _ctx: &ExtensionContext) -> AppResult<()> {
        Ok(())
    }

    /// Called when the extension is deactivated.
    async fn clean_up(&self, _ctx: &ExtensionContext) -> AppResult<()> {
        Ok(())
    }
}
