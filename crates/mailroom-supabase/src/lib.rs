//! # mailroom-supabase
//!
//! Supabase adapters for the mailroom seams.
//!
//! - **PostgREST**: `RpcClient` over `POST /rest/v1/rpc/<name>`
//! - **GoTrue**: `AuthGateway` over `GET /auth/v1/user`
//! - **Realtime** (default feature): `ChangeFeed` over the Phoenix websocket
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailroom_supabase::{SupabaseClient, SupabaseConfig};
//!
//! let config = SupabaseConfig::from_env()?;
//! let client = Arc::new(SupabaseClient::from_config(config.clone())?);
//! let actions = Actions::new(client.clone(), Caller::Service);
//! ```

pub mod client;
pub mod config;

#[cfg(feature = "realtime")]
pub mod realtime;

pub use client::SupabaseClient;
pub use config::SupabaseConfig;

#[cfg(feature = "realtime")]
pub use realtime::RealtimeFeed;
