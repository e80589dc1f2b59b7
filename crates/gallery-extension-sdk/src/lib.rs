//! # gallery-extension-sdk
//!
//! SDK for developing gallery server extensions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gallery_extension_sdk::prelude::*;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Extension for Hello {
//!     async fn init(&self, ctx: &ExtensionContext) -> AppResult<()> {
//!         ctx.routes
//!             .get("hello", None, |_req| async move { Ok("world") })
//!             .await?;
//!         ctx.events
//!             .before(HookPoint::LoadPhotoMetadata, |input| async move {
//!                 Ok(BeforeOutcome::Continue(input))
//!             })
//!             .await;
//!         Ok(())
//!     }
//! }
//!
//! // Only when building a `cdylib` for the dynamic loader.
//! export_extension!(Hello);
//! ```

pub use gallery_extension::export_extension;
pub use gallery_extension::loader::EXTENSION_ABI_VERSION;

/// Prelude for convenient imports.
pub mod prelude {
    pub use gallery_extension::prelude::*;

    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
}
