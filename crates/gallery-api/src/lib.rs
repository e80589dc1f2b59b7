//! # gallery-api
//!
//! HTTP API layer for the gallery server built on Axum.
//!
//! Provides the admin extension endpoints, the gallery endpoints whose
//! operations run through the extension hook chain, the dispatcher for
//! extension-contributed routes, middleware (RBAC, CORS, logging),
//! extractors, DTOs, and the host services handed to the extension runtime.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

pub use app::{build_app, build_state};
pub use state::AppState;
