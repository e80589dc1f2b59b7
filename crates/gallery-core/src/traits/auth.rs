//! Authentication contract.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::SessionUser;

/// Resolves the caller of a request from its credentials.
#[async_trait]
pub trait Authenticator: Send + Sync + std::fmt::Debug {
    /// Authenticates a bearer token.
    ///
    /// Returns an `Unauthorized` error when the token is missing or unknown.
    async fn authenticate(&self, bearer_token: Option<&str>) -> AppResult<SessionUser>;
}
