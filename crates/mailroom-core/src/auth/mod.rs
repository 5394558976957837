//! Session Resolution
//!
//! Maps a bearer token to the signed-in user. The identity provider owns
//! token issuance and expiry; this seam only asks it who the token belongs to.

mod mock;

pub use mock::MockAuthGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

/// Bearer token issued by the identity provider
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// The signed-in user as known to the identity provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Identity provider strategy
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Resolve the user owning `token`, `None` when the token is not accepted
    async fn current_user(&self, token: &AccessToken) -> Result<Option<AuthUser>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiJ9.secret");
        assert_eq!(format!("{token:?}"), "AccessToken(***)");
        assert_eq!(token.as_str(), "eyJhbGciOiJIUzI1NiJ9.secret");
    }
}
