//! Route handlers organized by domain.

pub mod admin;
pub mod extension;
pub mod gallery;
pub mod health;
