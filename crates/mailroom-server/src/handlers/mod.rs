//! HTTP/WebSocket Handlers

pub mod admin;
pub mod auth;
pub mod billing;
pub mod mail;
pub mod notifications;
pub mod user;
pub mod webhook;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::config::PublicConfig;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database_connected: bool,
    pub payments_configured: bool,
}

/// Acknowledgment for mutations with nothing else to return
#[derive(Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub const OK: Self = Self { ok: true };
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database_connected: state.rpc.health_check().await,
        payments_configured: state.paymongo.is_some(),
    })
}

/// Settings the browser client needs to talk to Supabase directly
pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.config.as_ref().clone())
}
