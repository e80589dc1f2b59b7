//! User roles, ordered by privilege.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Role of an authenticated gallery user.
///
/// Variants are declared from least to most privileged so the derived
/// ordering doubles as the privilege comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// May only see explicitly shared media.
    LimitedGuest,
    /// Read-only access to the gallery.
    Guest,
    /// Regular user.
    User,
    /// Administrator.
    Admin,
    /// Administrator with developer tooling.
    Developer,
}

impl UserRole {
    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: UserRole) -> bool {
        *self >= other
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LimitedGuest => "limited_guest",
            Self::Guest => "guest",
            Self::User => "user",
            Self::Admin => "admin",
            Self::Developer => "developer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "limited_guest" => Ok(Self::LimitedGuest),
            "guest" => Ok(Self::Guest),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "developer" => Ok(Self::Developer),
            other => Err(AppError::validation(format!("Unknown role '{other}'"))),
        }
    }
}
