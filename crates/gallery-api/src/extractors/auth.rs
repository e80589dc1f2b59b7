//! `AuthUser` extractor — resolves the bearer token to a session user.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use gallery_core::AppError;
use gallery_core::types::SessionUser;
use gallery_extension::routes::guard::bearer_token;

use crate::state::AppState;

/// Authenticated caller available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

impl std::ops::Deref for AuthUser {
    type Target = SessionUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let user = state.host.authenticator.authenticate(token).await?;
        Ok(AuthUser(user))
    }
}
