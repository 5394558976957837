//! Router assembly

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    admin, auth, billing, health_check, mail, notifications, public_config, user, webhook,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/config", get(public_config))
        // Session
        .route("/api/auth/data", get(auth::auth_data))
        .route("/api/auth/guard", get(auth::guard))
        .route("/api/auth/logout", post(auth::logout))
        // Account
        .route("/api/user", get(user::get_user).patch(user::update_profile))
        .route("/api/user/kyc", post(user::submit_kyc))
        // Mailbox
        .route("/api/mail", get(mail::mailroom))
        .route("/api/mail/{id}", get(mail::get_item))
        .route("/api/mail/{id}/read", post(mail::mark_read))
        .route("/api/mail/{id}/unread", post(mail::mark_unread))
        .route("/api/mail/{id}/archive", post(mail::archive))
        .route("/api/mail/{id}/unarchive", post(mail::unarchive))
        .route("/api/mail/{id}/scan", post(mail::request_scan))
        .route("/api/mail/{id}/forward", post(mail::request_forward))
        .route("/api/mail/{id}/dispose", post(mail::request_disposal))
        // Notifications
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/notifications/stream", get(notifications::stream))
        .route("/api/notifications/{id}/read", post(notifications::mark_read))
        // Catalog & payments
        .route("/api/plans", get(billing::plans))
        .route("/api/locations", get(billing::locations))
        .route("/api/payments/checkout", post(billing::create_checkout))
        .route("/api/payments/checkout/{id}", get(billing::get_checkout))
        .route("/api/payments/links", post(billing::create_link))
        .route("/api/payments/links/{id}", get(billing::get_link))
        .route("/api/subscription/cancel", post(billing::cancel_subscription))
        .route("/api/webhooks/paymongo", post(webhook::paymongo_webhook))
        // Back office
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/mail", post(admin::register_mail))
        .route("/api/admin/mail/{id}/status", post(admin::update_status))
        .route("/api/admin/mail/{id}/scan", post(admin::attach_scan))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
