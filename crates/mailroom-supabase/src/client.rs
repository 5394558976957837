//! Supabase HTTP Client
//!
//! Implements `RpcClient` over PostgREST and `AuthGateway` over GoTrue.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use mailroom_core::{
    AccessToken, AuthGateway, AuthUser, Caller, MailroomError, Result, RpcClient,
};

use crate::config::SupabaseConfig;

/// PostgREST / GoTrue error body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    hint: Option<String>,
    code: Option<String>,
}

impl ApiErrorBody {
    fn describe(self, fallback: &str) -> String {
        let message = self
            .message
            .or(self.msg)
            .or(self.error_description)
            .unwrap_or_else(|| fallback.to_string());
        match (self.code, self.hint) {
            (Some(code), Some(hint)) => format!("{message} ({code}; {hint})"),
            (Some(code), None) => format!("{message} ({code})"),
            (None, Some(hint)) => format!("{message} ({hint})"),
            (None, None) => message,
        }
    }
}

/// Supabase REST client
pub struct SupabaseClient {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    /// Create from configuration
    pub fn from_config(config: SupabaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(SupabaseConfig::from_env()?)
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Attach `apikey` and bearer headers for `caller`
    fn authorize(&self, request: RequestBuilder, caller: &Caller) -> RequestBuilder {
        match caller {
            Caller::Service => request
                .header("apikey", &self.config.service_role_key)
                .bearer_auth(&self.config.service_role_key),
            Caller::User(token) => request
                .header("apikey", &self.config.anon_key)
                .bearer_auth(token.as_str()),
        }
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        let fallback = status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => body.describe(&fallback),
            Err(_) => fallback,
        }
    }
}

#[async_trait]
impl RpcClient for SupabaseClient {
    async fn call(&self, caller: &Caller, function: &str, params: Value) -> Result<Value> {
        let url = self.config.rest_url(&format!("rpc/{function}"));
        let request = self.authorize(self.http.post(&url), caller).json(&params);

        let response = request
            .send()
            .await
            .map_err(|e| MailroomError::rpc(function, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            tracing::warn!(rpc = %function, status = status.as_u16(), %message, "Procedure rejected");
            return Err(MailroomError::RpcStatus {
                function: function.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MailroomError::rpc(function, e.to_string()))?;
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| MailroomError::Decode {
            function: function.to_string(),
            message: e.to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        let request = self.authorize(self.http.get(self.config.rest_url("")), &Caller::Service);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!("Supabase health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "Supabase"
    }
}

#[async_trait]
impl AuthGateway for SupabaseClient {
    async fn current_user(&self, token: &AccessToken) -> Result<Option<AuthUser>> {
        let response = self
            .http
            .get(self.config.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => Ok(Some(response.json::<AuthUser>().await?)),
            status => {
                let message = Self::error_message(response).await;
                Err(MailroomError::Other(format!(
                    "auth user lookup returned {}: {message}",
                    status.as_u16()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_description() {
        let body: ApiErrorBody = serde_json::from_value(serde_json::json!({
            "message": "Mail item not found",
            "code": "P0002",
            "hint": null
        }))
        .unwrap();
        assert_eq!(body.describe("Bad Request"), "Mail item not found (P0002)");

        let empty = ApiErrorBody::default();
        assert_eq!(empty.describe("Bad Request"), "Bad Request");
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = SupabaseConfig::new("http://localhost:54321", "anon", "service");
        let client = SupabaseClient::from_config(config).unwrap();
        assert_eq!(client.name(), "Supabase");
        assert_eq!(client.config().url, "http://localhost:54321");
    }
}
