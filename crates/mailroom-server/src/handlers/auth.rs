//! Session endpoints: cached permissions, route guard, logout

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use mailroom_core::access::{self, AccessDecision};
use mailroom_core::model::UserAuthData;

use crate::error::ApiError;
use crate::extract::{CurrentUser, Session, clear_auth_data};
use crate::state::AppState;

/// Permissions for the signed-in user, served from the `auth_data` cookie
/// when it is fresh
pub async fn auth_data(session: Session) -> (SignedCookieJar, Json<UserAuthData>) {
    (session.jar, Json(session.auth))
}

#[derive(Debug, Deserialize)]
pub struct GuardQuery {
    pub path: String,
}

/// Where the browser may go next for `path`
pub async fn guard(
    State(state): State<AppState>,
    user: Option<CurrentUser>,
    jar: SignedCookieJar,
    Query(query): Query<GuardQuery>,
) -> Result<(SignedCookieJar, Json<AccessDecision>), ApiError> {
    let Some(user) = user else {
        return Ok((jar, Json(access::guard(&query.path, None).into())));
    };

    let session = Session::load(&state, user, jar).await?;
    let decision = access::guard(&query.path, Some(&session.auth));
    if let Some(target) = decision.redirect_target() {
        tracing::debug!(path = %query.path, redirect = target, "Redirecting");
    }
    Ok((session.jar, Json(decision.into())))
}

pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, StatusCode) {
    (clear_auth_data(jar), StatusCode::NO_CONTENT)
}
