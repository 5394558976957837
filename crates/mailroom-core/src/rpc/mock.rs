//! Recording RPC Client
//!
//! For tests and offline development. Returns canned results per procedure
//! and keeps every invocation so tests can assert on call counts and params.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use super::{Caller, RpcClient};
use crate::error::{MailroomError, Result};

/// One recorded invocation
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub caller: Caller,
    pub function: String,
    pub params: Value,
}

/// Mock RPC client with canned results
#[derive(Default)]
pub struct MockRpcClient {
    responses: RwLock<HashMap<String, Value>>,
    failures: RwLock<HashSet<String>>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MockRpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `function` with `value`. Unregistered procedures answer `null`.
    #[must_use]
    pub fn with_response(self, function: &str, value: Value) -> Self {
        self.set_response(function, value);
        self
    }

    /// Make `function` fail with a transport error
    #[must_use]
    pub fn with_failure(self, function: &str) -> Self {
        self.failures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(function.to_string());
        self
    }

    pub fn set_response(&self, function: &str, value: Value) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(function.to_string(), value);
    }

    /// All invocations in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invocations of one procedure
    pub fn calls_to(&self, function: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.function == function)
            .collect()
    }

    pub fn call_count(&self, function: &str) -> usize {
        self.calls_to(function).len()
    }
}

#[async_trait]
impl RpcClient for MockRpcClient {
    async fn call(&self, caller: &Caller, function: &str, params: Value) -> Result<Value> {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                caller: caller.clone(),
                function: function.to_string(),
                params,
            });

        let failing = self
            .failures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(function);
        if failing {
            return Err(MailroomError::rpc(function, "mock failure"));
        }

        let responses = self.responses.read().unwrap_or_else(PoisonError::into_inner);
        Ok(responses.get(function).cloned().unwrap_or(Value::Null))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "MockRpc"
    }
}
