//! Mailbox endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use mailroom_core::model::{ForwardRequest, MailItem, MailroomData};

use super::Ack;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub async fn mailroom(State(state): State<AppState>, user: CurrentUser) -> Json<MailroomData> {
    Json(user.actions(&state).get_mailroom_data(user.id()).await)
}

pub async fn get_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<MailItem>, ApiError> {
    user.actions(&state)
        .get_mail_item(user.id(), item_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Mail item".into()))
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state).mark_mail_item_as_read(item_id).await?;
    Ok(Json(Ack::OK))
}

pub async fn mark_unread(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state).mark_mail_item_as_unread(item_id).await?;
    Ok(Json(Ack::OK))
}

pub async fn archive(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state).archive_mail_item(item_id).await?;
    Ok(Json(Ack::OK))
}

pub async fn unarchive(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state).unarchive_mail_item(item_id).await?;
    Ok(Json(Ack::OK))
}

pub async fn request_scan(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state).request_mail_item_scan(item_id).await?;
    tracing::info!(user_id = %user.id(), %item_id, "Scan requested");
    Ok(Json(Ack::OK))
}

pub async fn request_forward(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(request): Json<ForwardRequest>,
) -> Result<Json<Ack>, ApiError> {
    if request.address.trim().is_empty() {
        return Err(ApiError::BadRequest("Forwarding address is required".into()));
    }

    user.actions(&state)
        .request_mail_item_forward(item_id, &request)
        .await?;
    tracing::info!(user_id = %user.id(), %item_id, "Forward requested");
    Ok(Json(Ack::OK))
}

pub async fn request_disposal(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state).request_mail_item_disposal(item_id).await?;
    tracing::info!(user_id = %user.id(), %item_id, "Disposal requested");
    Ok(Json(Ack::OK))
}
