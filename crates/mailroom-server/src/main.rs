//! Mailroom HTTP Server
//!
//! Axum-based server exposing the mailbox actions, the PayMongo webhook and
//! a websocket relay of live notifications.

mod config;
mod error;
mod extract;
mod handlers;
mod routes;
mod state;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailroom_core::RpcClient;
use mailroom_payments::PayMongoClient;
use mailroom_supabase::{RealtimeFeed, SupabaseClient};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;

    // Supabase adapters
    let supabase = Arc::new(SupabaseClient::from_config(config.supabase.clone())?);
    if supabase.health_check().await {
        tracing::info!(url = %config.supabase.url, "✓ Connected to Supabase");
    } else {
        tracing::warn!(url = %config.supabase.url, "⚠ Supabase not reachable - requests will fail");
    }
    let feed = Arc::new(RealtimeFeed::new(config.supabase.clone()));

    // Payments
    let paymongo = PayMongoClient::from_env().ok();
    if paymongo.is_some() {
        tracing::info!("✓ PayMongo configured");
    } else {
        tracing::warn!("⚠ PayMongo not configured - payments disabled");
        tracing::warn!("  Set PAYMONGO_SECRET_KEY and PAYMONGO_WEBHOOK_SECRET in .env");
    }

    let state = AppState {
        rpc: supabase.clone(),
        auth: supabase,
        feed,
        paymongo: paymongo.map(Arc::new),
        config: Arc::new(config.public()),
        cookie_key: config.cookie_key.clone(),
    };

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 mailroom server running on http://{}", config.bind_addr);
    tracing::info!("  Site URL: {}", config.site_url);

    axum::serve(listener, app).await?;

    Ok(())
}
