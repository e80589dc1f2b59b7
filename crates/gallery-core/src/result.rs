//! Convenience result type alias for the gallery server.

use crate::error::AppError;

/// A specialized `Result` type for gallery operations.
pub type AppResult<T> = Result<T, AppError>;
