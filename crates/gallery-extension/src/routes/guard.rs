//! Authentication and role guard composed in front of extension routes.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use gallery_core::traits::{Authenticator, CacheInvalidator, GalleryLookup};
use gallery_core::types::{SessionUser, UserRole};
use gallery_core::{AppError, AppResult};

/// Host collaborators reachable from extension routes.
#[derive(Debug, Clone)]
pub struct HostServices {
    /// Resolves bearer tokens to session users.
    pub authenticator: Arc<dyn Authenticator>,
    /// Resolves media paths and access rights.
    pub gallery: Arc<dyn GalleryLookup>,
    /// Invalidates cached directory listings.
    pub cache: Arc<dyn CacheInvalidator>,
}

/// Authentication + minimum-role check for one route.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    authenticator: Arc<dyn Authenticator>,
    minimum_role: Option<UserRole>,
}

impl AuthGuard {
    /// Creates a guard. `None` lets anonymous callers through.
    pub fn new(authenticator: Arc<dyn Authenticator>, minimum_role: Option<UserRole>) -> Self {
        Self {
            authenticator,
            minimum_role,
        }
    }

    /// The role this guard requires, if any.
    pub fn minimum_role(&self) -> Option<UserRole> {
        self.minimum_role
    }

    /// Runs the guard against request headers.
    ///
    /// Returns the authenticated user when a role is required, `None` for
    /// public routes.
    pub async fn check(&self, headers: &HeaderMap) -> AppResult<Option<SessionUser>> {
        match self.minimum_role {
            Some(role) => self.require(headers, role).await.map(Some),
            None => Ok(None),
        }
    }

    /// Authenticates the caller and checks it holds at least `role`.
    pub async fn require(&self, headers: &HeaderMap, role: UserRole) -> AppResult<SessionUser> {
        let user = self.authenticator.authenticate(bearer_token(headers)?).await?;

        if !user.role.has_at_least(role) {
            return Err(AppError::forbidden(format!(
                "Role '{role}' or higher required"
            )));
        }
        Ok(user)
    }
}

/// Extracts the bearer token from the `Authorization` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization header format"))
}
