//! Admin-only handlers.

pub mod extensions;
