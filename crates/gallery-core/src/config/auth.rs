//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::types::UserRole;

/// Authentication configuration.
///
/// The gallery's own login flow lives outside this workspace; the server
/// accepts pre-shared bearer tokens mapped to users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accepted API tokens.
    #[serde(default)]
    pub tokens: Vec<ApiTokenConfig>,
}

/// A pre-shared bearer token and the user it authenticates as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTokenConfig {
    /// The bearer token value.
    pub token: String,
    /// Username reported for requests using this token.
    pub username: String,
    /// Role granted to this token.
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}
