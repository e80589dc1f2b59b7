//! # gallery-core
//!
//! Core crate for the gallery server. Contains configuration schemas,
//! shared types (roles, session users, media records), the traits through
//! which the extension runtime reaches host collaborators, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other gallery crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
