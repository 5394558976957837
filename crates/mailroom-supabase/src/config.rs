//! Supabase connection settings

use mailroom_core::{MailroomError, Result};

/// Supabase project configuration
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,

    /// Public anon key. Safe to hand to browsers.
    pub anon_key: String,

    /// Service-role key. Bypasses row-level security; server only.
    pub service_role_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl SupabaseConfig {
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
            timeout_secs: 30,
        }
    }

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_SERVICE_ROLE_KEY`
    pub fn from_env() -> Result<Self> {
        let url = required("SUPABASE_URL")?;
        let anon_key = required("SUPABASE_ANON_KEY")?;
        let service_role_key = required("SUPABASE_SERVICE_ROLE_KEY")?;

        let mut config = Self::new(url, anon_key, service_role_key);
        if let Some(timeout) = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
        {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }

    /// Realtime websocket endpoint authenticated with `api_key`
    pub fn realtime_url(&self, api_key: &str) -> String {
        let ws_base = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.url.clone()
        };
        format!("{ws_base}/realtime/v1/websocket?apikey={api_key}&vsn=1.0.0")
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| MailroomError::Config(format!("{name} not set")))
}
