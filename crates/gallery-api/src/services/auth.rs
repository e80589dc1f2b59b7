//! Static API-token authentication from configuration.

use std::collections::HashMap;

use async_trait::async_trait;

use gallery_core::config::auth::AuthConfig;
use gallery_core::traits::Authenticator;
use gallery_core::types::SessionUser;
use gallery_core::{AppError, AppResult};

/// Resolves bearer tokens against `auth.tokens`.
#[derive(Clone)]
pub struct ConfigAuthenticator {
    users: HashMap<String, SessionUser>,
}

impl std::fmt::Debug for ConfigAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigAuthenticator")
            .field("token_count", &self.users.len())
            .finish()
    }
}

impl ConfigAuthenticator {
    /// Builds the token table from configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let users = config
            .tokens
            .iter()
            .map(|t| (t.token.clone(), SessionUser::new(&t.username, t.role)))
            .collect();
        Self { users }
    }
}

#[async_trait]
impl Authenticator for ConfigAuthenticator {
    async fn authenticate(&self, bearer_token: Option<&str>) -> AppResult<SessionUser> {
        let token = bearer_token.ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;
        self.users
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use gallery_core::config::auth::ApiTokenConfig;
    use gallery_core::error::ErrorKind;
    use gallery_core::types::UserRole;

    use super::*;

    fn authenticator() -> ConfigAuthenticator {
        ConfigAuthenticator::new(&AuthConfig {
            tokens: vec![ApiTokenConfig {
                token: "secret".into(),
                username: "root".into(),
                role: UserRole::Admin,
            }],
        })
    }

    #[tokio::test]
    async fn test_known_token() {
        let user = authenticator()
            .authenticate(Some("secret"))
            .await
            .expect("auth");
        assert_eq!(user, SessionUser::new("root", UserRole::Admin));
    }

    #[tokio::test]
    async fn test_missing_and_unknown_tokens() {
        let auth = authenticator();
        for token in [None, Some("nope")] {
            let err = auth.authenticate(token).await.expect_err("rejected");
            assert_eq!(err.kind, ErrorKind::Unauthorized);
        }
    }
}
