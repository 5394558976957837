//! Auth-data cookie cache
//!
//! Single-entry memoization of [`UserAuthData`] keyed by user id with a
//! wall-clock expiry. The entry travels in a cookie as base64url JSON
//! `{data, exp, user_id}`; `exp` is Unix epoch milliseconds.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::actions::Actions;
use crate::error::Result;
use crate::model::UserAuthData;

/// Cookie holding the cached entry
pub const AUTH_DATA_COOKIE: &str = "auth_data";

/// Entry lifetime
pub const AUTH_DATA_TTL_SECS: i64 = 5 * 60;

/// Cached permissions for one user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDataCacheEntry {
    pub data: UserAuthData,
    pub exp: i64,
    pub user_id: Uuid,
}

impl AuthDataCacheEntry {
    /// Fresh entry expiring [`AUTH_DATA_TTL_SECS`] after `now`
    pub fn new(user_id: Uuid, data: UserAuthData, now: DateTime<Utc>) -> Self {
        Self {
            data,
            exp: now.timestamp_millis() + AUTH_DATA_TTL_SECS * 1000,
            user_id,
        }
    }

    /// Usable for `user_id` at `now`
    pub fn is_valid_for(&self, user_id: Uuid, now: DateTime<Utc>) -> bool {
        self.user_id == user_id && self.exp > now.timestamp_millis()
    }

    /// Cookie-safe encoding
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Parse a cookie value; anything unreadable is a miss
    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

/// Outcome of a cache lookup
#[derive(Clone, Debug)]
pub struct ResolvedAuthData {
    pub data: UserAuthData,

    /// New entry to write back; `None` on a hit
    pub refreshed: Option<AuthDataCacheEntry>,
}

impl ResolvedAuthData {
    pub fn was_hit(&self) -> bool {
        self.refreshed.is_none()
    }
}

/// Return the cached entry when it is valid for `user_id`, otherwise fetch
/// once through `actions` and hand back a new entry for the caller to store.
pub async fn resolve_auth_data(
    cookie: Option<&str>,
    user_id: Uuid,
    now: DateTime<Utc>,
    actions: &Actions,
) -> Result<ResolvedAuthData> {
    if let Some(entry) = cookie.and_then(AuthDataCacheEntry::decode) {
        if entry.is_valid_for(user_id, now) {
            tracing::debug!(%user_id, "Auth data cache hit");
            return Ok(ResolvedAuthData {
                data: entry.data,
                refreshed: None,
            });
        }
        tracing::debug!(%user_id, "Auth data cache entry stale or foreign");
    }

    let data = actions.get_user_auth_data(user_id).await?;
    let entry = AuthDataCacheEntry::new(user_id, data.clone(), now);

    Ok(ResolvedAuthData {
        data,
        refreshed: Some(entry),
    })
}
