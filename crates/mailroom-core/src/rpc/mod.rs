//! Remote Procedure Strategy
//!
//! Every mutation and most reads go through named stored procedures in the
//! external database. The contract of each procedure lives there; this seam
//! only knows how to invoke one by name with a JSON parameter object.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailroom_core::rpc::{Caller, RpcClient};
//!
//! let value = client
//!     .call(&Caller::user(token), "get_user_full_details", json!({ "input_user_id": id }))
//!     .await?;
//! ```

mod mock;

pub use mock::{MockRpcClient, RecordedCall};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::AccessToken;
use crate::error::{MailroomError, Result};

/// Whose privileges a procedure runs with
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Caller {
    /// Service-role credentials, bypassing row-level security
    Service,

    /// The signed-in user's session
    User(AccessToken),
}

impl Caller {
    pub fn user(token: AccessToken) -> Self {
        Self::User(token)
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Self::Service)
    }
}

/// Remote procedure client strategy
///
/// Implemented by the Supabase adapter and by [`MockRpcClient`].
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Invoke `function` with `params`, returning the raw JSON result
    ///
    /// Procedures returning `void` yield `Value::Null`.
    async fn call(&self, caller: &Caller, function: &str, params: Value) -> Result<Value>;

    /// Check the database is reachable
    async fn health_check(&self) -> bool;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Decode a procedure result into its typed shape
pub fn decode<T: DeserializeOwned>(function: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| MailroomError::Decode {
        function: function.to_string(),
        message: e.to_string(),
    })
}
