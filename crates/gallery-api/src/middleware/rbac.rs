//! RBAC helpers for role-based route guarding.

use gallery_core::AppError;
use gallery_core::types::UserRole;

use crate::extractors::AuthUser;

/// Checks that the authenticated user has at least the Admin role.
pub fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    require_role(auth, UserRole::Admin)
}

/// Checks that the authenticated user has at least `role`.
pub fn require_role(auth: &AuthUser, role: UserRole) -> Result<(), AppError> {
    if !auth.role.has_at_least(role) {
        return Err(AppError::forbidden(format!("Role '{role}' or higher required")));
    }
    Ok(())
}
