//! In-memory identity provider for tests and local development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{AccessToken, AuthGateway, AuthUser};
use crate::error::Result;

/// Accepts only the tokens registered with [`MockAuthGateway::with_user`]
#[derive(Default)]
pub struct MockAuthGateway {
    users: RwLock<HashMap<String, AuthUser>>,
}

impl MockAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as belonging to `user`
    #[must_use]
    pub fn with_user(self, token: &str, user: AuthUser) -> Self {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.to_string(), user);
        self
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn current_user(&self, token: &AccessToken) -> Result<Option<AuthUser>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(token.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_unknown_token_has_no_user() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some("ana@example.com".into()),
        };
        let gateway = MockAuthGateway::new().with_user("good", user.clone());

        let found = gateway.current_user(&AccessToken::new("good")).await.unwrap();
        assert_eq!(found, Some(user));

        let missing = gateway.current_user(&AccessToken::new("bad")).await.unwrap();
        assert!(missing.is_none());
    }
}
