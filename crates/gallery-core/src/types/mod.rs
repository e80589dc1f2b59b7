//! Core type definitions used across the gallery workspace.

pub mod media;
pub mod response;
pub mod role;
pub mod user;

pub use media::{MediaKind, MediaRecord};
pub use response::{ApiErrorResponse, ApiResponse};
pub use role::UserRole;
pub use user::SessionUser;
