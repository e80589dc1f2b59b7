//! Extension API — the capability object and the handles it bundles.

pub mod context;
pub mod messenger;
pub mod services;
pub mod ui;

pub use context::{ContextServices, ExtensionContext};
pub use messenger::{ExtensionMessengers, Message, Messenger, MessengerRepository};
pub use services::{ExtensionConfigHandle, ExtensionEvents, ExtensionLogger};
pub use ui::{ButtonPopup, ExtensionUi, MediaButton, MediaButtonConfig, PopupField, UiRegistry};
