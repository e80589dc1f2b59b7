//! Directory cache invalidation.

use async_trait::async_trait;
use tracing::debug;

use gallery_core::AppResult;
use gallery_core::traits::CacheInvalidator;

/// The filesystem gallery reads directories on demand and keeps no
/// listing cache, so invalidation only records the event.
#[derive(Debug, Default, Clone)]
pub struct LoggingCacheInvalidator;

#[async_trait]
impl CacheInvalidator for LoggingCacheInvalidator {
    async fn invalidate_directory(&self, directory: &str) -> AppResult<()> {
        debug!(directory = %directory, "Directory cache invalidated");
        Ok(())
    }
}
