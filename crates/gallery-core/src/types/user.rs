//! The authenticated caller of a request.

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// User attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Login name.
    pub username: String,
    /// Granted role.
    pub role: UserRole,
}

impl SessionUser {
    /// Creates a session user.
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}
