//! # gallery-extension
//!
//! Extension runtime for the gallery server. Provides:
//!
//! - Interceptor chain over named hook points with before/after handlers
//!   and short-circuiting
//! - Namespaced extension routes under `/extension/<unique_id>/...` with
//!   role guards and media-scoped operations
//! - A registry assigning collision-free unique ids to active extensions
//! - Lifecycle management: catalog install, init, reload, delete, cleanup
//! - The capability object handed to each extension on `init`
//! - Optional dynamic loading via `libloading` (`dynamic` feature)

pub mod api;
pub mod extension;
pub mod hooks;
pub mod installer;
pub mod janitor;
pub mod lifecycle;
pub mod loader;
pub mod lock;
pub mod macros;
pub mod manager;
pub mod manifest;
pub mod prelude;
pub mod registry;
pub mod routes;
pub mod store;

pub use api::context::ExtensionContext;
pub use extension::Extension;
pub use hooks::bus::EventBus;
pub use hooks::definitions::{AfterData, BeforeOutcome, HookPhase, HookPoint};
pub use hooks::registry::HookRegistry;
pub use lifecycle::{ExtensionState, InitOutcome, InitSummary, InstalledExtension, SkipReason};
pub use loader::{BuiltinLoader, ExtensionLoader};
pub use manager::ExtensionManager;
pub use registry::ExtensionRegistry;
pub use routes::{ExtensionRouter, HostServices, RouteTable};
pub use store::{ExtensionConfigEntry, ExtensionConfigStore, JsonFileConfigStore};
