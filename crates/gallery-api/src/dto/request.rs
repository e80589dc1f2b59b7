//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use gallery_core::{AppError, AppResult};

/// Install-from-catalog request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InstallExtensionRequest {
    /// Catalog id.
    #[validate(length(min = 1, max = 200, message = "Catalog id is required"))]
    pub id: String,
}

/// Enable/disable request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEnabledRequest {
    /// New enablement.
    pub enabled: bool,
}

/// Query naming one media item; also the input of the metadata hooks.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MediaPathQuery {
    /// Library-relative media path.
    #[validate(length(min = 1, max = 4096, message = "Media path is required"))]
    pub path: String,
}

/// Search query; also the input of the search hook.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchQuery {
    /// Text matched against media names.
    #[validate(length(max = 200))]
    #[serde(default)]
    pub query: String,
}

/// Runs `validator` checks and maps failures to a validation error.
pub fn validate<T: Validate>(value: &T) -> AppResult<()> {
    value
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))
}
