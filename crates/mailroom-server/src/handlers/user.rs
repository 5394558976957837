//! Account endpoints

use axum::{Json, extract::State};
use axum_extra::extract::cookie::SignedCookieJar;

use mailroom_core::model::{KycSubmission, ProfileUpdate, UserFullDetails, UserProfile};

use super::Ack;
use crate::error::ApiError;
use crate::extract::{CurrentUser, clear_auth_data};
use crate::state::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UserFullDetails>, ApiError> {
    let details = user.actions(&state).get_user_full_details(user.id()).await?;
    Ok(Json(details))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    Json(update): Json<ProfileUpdate>,
) -> Result<(SignedCookieJar, Json<UserProfile>), ApiError> {
    let profile = user
        .actions(&state)
        .update_user_profile(user.id(), &update)
        .await?;
    Ok((clear_auth_data(jar), Json(profile)))
}

pub async fn submit_kyc(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: SignedCookieJar,
    Json(submission): Json<KycSubmission>,
) -> Result<(SignedCookieJar, Json<Ack>), ApiError> {
    if submission.id_number.trim().is_empty() || submission.id_front_url.trim().is_empty() {
        return Err(ApiError::BadRequest("ID number and front image are required".into()));
    }

    user.actions(&state).submit_kyc(user.id(), &submission).await?;
    tracing::info!(user_id = %user.id(), id_type = %submission.id_type, "KYC submitted");
    Ok((clear_auth_data(jar), Json(Ack::OK)))
}
