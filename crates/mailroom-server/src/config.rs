//! Server Configuration

use std::fmt;

use anyhow::Context;
use axum_extra::extract::cookie::Key;
use serde::Serialize;

use mailroom_supabase::SupabaseConfig;

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Secret the `auth_data` cookie is signed with
pub const AUTH_COOKIE_SECRET_ENV: &str = "AUTH_COOKIE_SECRET";

/// Process configuration, read once at startup
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Public origin of the web app; checkout return URLs hang off it
    pub site_url: String,

    pub supabase: SupabaseConfig,

    /// Signs the `auth_data` cookie
    pub cookie_key: Key,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("site_url", &self.site_url)
            .field("supabase", &self.supabase)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let supabase = SupabaseConfig::from_env().context("Supabase is not configured")?;

        let site_url = std::env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.into());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let cookie_key = cookie_key(std::env::var(AUTH_COOKIE_SECRET_ENV).ok().as_deref())?;

        Ok(Self {
            bind_addr,
            site_url: site_url.trim_end_matches('/').to_string(),
            supabase,
            cookie_key,
        })
    }

    /// The subset browsers may see
    pub fn public(&self) -> PublicConfig {
        PublicConfig {
            site_url: self.site_url.clone(),
            supabase_url: self.supabase.url.clone(),
            supabase_anon_key: self.supabase.anon_key.clone(),
        }
    }
}

/// Key from a configured secret (at least 64 bytes), or a per-process one
fn cookie_key(secret: Option<&str>) -> anyhow::Result<Key> {
    match secret.map(str::trim).filter(|s| !s.is_empty()) {
        Some(secret) => Key::try_from(secret.as_bytes())
            .with_context(|| format!("{AUTH_COOKIE_SECRET_ENV} must be at least 64 bytes")),
        None => {
            tracing::warn!(
                "{AUTH_COOKIE_SECRET_ENV} not set - using a random key, cached permissions reset on restart"
            );
            Ok(Key::generate())
        }
    }
}

/// Client-safe configuration served at `/api/config`
#[derive(Clone, Debug, Default, Serialize)]
pub struct PublicConfig {
    pub site_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl PublicConfig {
    pub fn payment_success_url(&self) -> String {
        format!("{}/payment/success", self.site_url)
    }

    pub fn payment_cancel_url(&self) -> String {
        format!("{}/pricing", self.site_url)
    }
}
