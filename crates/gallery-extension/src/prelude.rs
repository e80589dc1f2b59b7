//! Prelude for convenient imports.

pub use async_trait::async_trait;

pub use crate::api::context::ExtensionContext;
pub use crate::api::messenger::{Message, Messenger};
pub use crate::api::ui::{ButtonPopup, MediaButtonConfig, PopupField};
pub use crate::extension::Extension;
pub use crate::hooks::definitions::{AfterData, BeforeOutcome, HookPoint};
pub use crate::routes::handler::{MediaRequest, RouteRequest};

pub use gallery_core::types::{MediaRecord, SessionUser, UserRole};
pub use gallery_core::{AppError, AppResult};

pub use crate::export_extension;
