//! Back-office endpoints (staff and admins)

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use uuid::Uuid;

use mailroom_core::model::{AdminDashboardStats, MailItem, MailItemStatus, NewMailItem, UserProfile};

use super::Ack;
use crate::error::ApiError;
use crate::extract::BackOffice;
use crate::state::AppState;

pub async fn stats(
    State(state): State<AppState>,
    BackOffice(session): BackOffice,
) -> Result<(SignedCookieJar, Json<AdminDashboardStats>), ApiError> {
    let stats = session
        .user
        .actions(&state)
        .admin_get_dashboard_stats()
        .await?;
    Ok((session.jar, Json(stats)))
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub search: Option<String>,
}

const fn first_page() -> u32 {
    1
}

const fn default_per_page() -> u32 {
    25
}

pub async fn list_users(
    State(state): State<AppState>,
    BackOffice(session): BackOffice,
    Query(query): Query<UserListQuery>,
) -> Result<(SignedCookieJar, Json<Vec<UserProfile>>), ApiError> {
    let users = session
        .user
        .actions(&state)
        .admin_list_users(query.page, query.per_page, query.search.as_deref())
        .await?;
    Ok((session.jar, Json(users)))
}

pub async fn register_mail(
    State(state): State<AppState>,
    BackOffice(session): BackOffice,
    Json(item): Json<NewMailItem>,
) -> Result<(SignedCookieJar, Json<MailItem>), ApiError> {
    let registered = session
        .user
        .actions(&state)
        .admin_register_mail_item(&item)
        .await?;
    tracing::info!(
        staff_id = %session.user.id(),
        mailbox_id = %item.mailbox_id,
        item_id = %registered.id,
        "Mail item registered"
    );
    Ok((session.jar, Json(registered)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: MailItemStatus,
    pub note: Option<String>,
}

pub async fn update_status(
    State(state): State<AppState>,
    BackOffice(session): BackOffice,
    Path(item_id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<(SignedCookieJar, Json<Ack>), ApiError> {
    session
        .user
        .actions(&state)
        .admin_update_mail_item_status(item_id, body.status, body.note.as_deref())
        .await?;
    tracing::info!(%item_id, status = body.status.as_str(), "Mail item status updated");
    Ok((session.jar, Json(Ack::OK)))
}

#[derive(Debug, Deserialize)]
pub struct ScanBody {
    pub scan_url: String,
}

pub async fn attach_scan(
    State(state): State<AppState>,
    BackOffice(session): BackOffice,
    Path(item_id): Path<Uuid>,
    Json(body): Json<ScanBody>,
) -> Result<(SignedCookieJar, Json<Ack>), ApiError> {
    session
        .user
        .actions(&state)
        .admin_attach_scan(item_id, &body.scan_url)
        .await?;
    Ok((session.jar, Json(Ack::OK)))
}
