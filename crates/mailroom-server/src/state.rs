//! Application State

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use mailroom_core::{AccessToken, Actions, AuthGateway, Caller, ChangeFeed, RpcClient};
use mailroom_payments::PayMongoClient;

use crate::config::PublicConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Stored-procedure client (PostgREST)
    pub rpc: Arc<dyn RpcClient>,

    /// Resolves bearer tokens to users
    pub auth: Arc<dyn AuthGateway>,

    /// Realtime notification inserts
    pub feed: Arc<dyn ChangeFeed>,

    /// PayMongo client (optional - None if not configured)
    pub paymongo: Option<Arc<PayMongoClient>>,

    pub config: Arc<PublicConfig>,

    /// Signs the `auth_data` cookie
    pub cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl AppState {
    /// Actions running under the signed-in user's session
    pub fn user_actions(&self, token: &AccessToken) -> Actions {
        Actions::new(self.rpc.clone(), Caller::user(token.clone()))
    }

    /// Actions for public catalog reads that need no session
    pub fn service_actions(&self) -> Actions {
        Actions::new(self.rpc.clone(), Caller::Service)
    }
}
