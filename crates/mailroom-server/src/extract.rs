//! Request extractors
//!
//! [`CurrentUser`] resolves the bearer token (header or Supabase session
//! cookie). [`Session`] additionally loads the user's permissions through the
//! signed `auth_data` cookie cache and carries the updated jar so handlers can
//! hand it back with their response. A cookie whose signature does not verify
//! is treated as a miss. [`BackOffice`] is a `Session` that must belong to
//! staff or an admin.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite, SignedCookieJar};
use chrono::Utc;
use uuid::Uuid;

use mailroom_core::cache::{AUTH_DATA_COOKIE, AUTH_DATA_TTL_SECS};
use mailroom_core::model::UserAuthData;
use mailroom_core::{AccessToken, Actions, AuthUser, resolve_auth_data};

use crate::error::ApiError;
use crate::state::AppState;

/// Cookie the browser client stores its access token in
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// The signed-in user
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: AuthUser,
    pub token: AccessToken,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn actions(&self, state: &AppState) -> Actions {
        state.user_actions(&self.token)
    }
}

fn access_token(parts: &Parts) -> Option<AccessToken> {
    let from_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(AccessToken::new);

    from_header.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(ACCESS_TOKEN_COOKIE)
            .map(|c| c.value().trim().to_string())
            .filter(|t| !t.is_empty())
            .map(AccessToken::new)
    })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        <Self as OptionalFromRequestParts<AppState>>::from_request_parts(parts, state)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let Some(token) = access_token(parts) else {
            return Ok(None);
        };

        let user = state.auth.current_user(&token).await?;
        if user.is_none() {
            tracing::debug!("Access token rejected by identity provider");
        }
        Ok(user.map(|user| Self { user, token }))
    }
}

/// Signed-in user plus cached permissions
pub struct Session {
    pub user: CurrentUser,
    pub auth: UserAuthData,

    /// Request cookies, with a refreshed `auth_data` entry on a cache miss
    pub jar: SignedCookieJar,
}

impl Session {
    pub async fn load(
        state: &AppState,
        user: CurrentUser,
        jar: SignedCookieJar,
    ) -> Result<Self, ApiError> {
        let actions = user.actions(state);
        let cookie = jar.get(AUTH_DATA_COOKIE).map(|c| c.value().to_string());

        let resolved = resolve_auth_data(cookie.as_deref(), user.id(), Utc::now(), &actions).await?;

        let jar = match resolved.refreshed {
            Some(entry) => jar.add(auth_data_cookie(entry.encode()?)),
            None => jar,
        };

        Ok(Self {
            user,
            auth: resolved.data,
            jar,
        })
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = <CurrentUser as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        let jar = SignedCookieJar::from_headers(&parts.headers, state.cookie_key.clone());
        Self::load(state, user, jar).await
    }
}

/// Session belonging to staff or an admin
pub struct BackOffice(pub Session);

impl FromRequestParts<AppState> for BackOffice {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = <Session as FromRequestParts<AppState>>::from_request_parts(parts, state).await?;
        if !session.auth.role.is_back_office() {
            tracing::warn!(user_id = %session.user.id(), role = session.auth.role.as_str(), "Back-office access denied");
            return Err(ApiError::Forbidden("back office".into()));
        }
        Ok(Self(session))
    }
}

/// `auth_data` cookie carrying an encoded cache entry
pub fn auth_data_cookie(value: String) -> Cookie<'static> {
    Cookie::build((AUTH_DATA_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(AUTH_DATA_TTL_SECS))
        .build()
}

/// Drop the cached permissions so the next read refetches
pub fn clear_auth_data(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(AUTH_DATA_COOKIE).path("/"))
}
