//! # mailroom-core
//!
//! Domain shapes and remote seams for the virtual-mailbox service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Actions                             │
//! │   users · mail · notifications · billing · admin             │
//! │        │                                                     │
//! │  ┌─────▼──────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │  │ RpcClient  │   │ AuthGateway  │   │   ChangeFeed     │   │
//! │  │ (Strategy) │   │  (Strategy)  │   │   (Strategy)     │   │
//! │  └────────────┘   └──────────────┘   └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business rules live in the external database's stored procedures. This
//! crate names them, shapes their parameters and decodes their results.
//! The Supabase adapters live in `mailroom-supabase`; in-memory mocks for
//! each seam ship here for tests and offline runs.

pub mod access;
pub mod actions;
pub mod auth;
pub mod cache;
pub mod error;
pub mod feed;
pub mod model;
pub mod rpc;

pub use access::{Access, AccessDecision};
pub use actions::Actions;
pub use auth::{AccessToken, AuthGateway, AuthUser};
pub use cache::{AuthDataCacheEntry, ResolvedAuthData, resolve_auth_data};
pub use error::{MailroomError, Result};
pub use feed::{ChangeFeed, NotificationStream};
pub use rpc::{Caller, RpcClient};
