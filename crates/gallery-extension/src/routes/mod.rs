//! Extension routes — namespaced registration, guards, and dispatch.

pub mod binder;
pub mod guard;
pub mod handler;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use binder::ExtensionRouter;
pub use guard::{AuthGuard, HostServices};
pub use handler::{MediaRequest, RouteHandler, RouteRequest};
pub use table::{EXTENSION_API_PREFIX, RouteEntry, RouteInfo, RouteTable};
