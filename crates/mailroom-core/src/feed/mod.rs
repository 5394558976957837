//! Realtime Change Feed
//!
//! Push subscription to notification inserts. Ordering and delivery are the
//! database service's business; a subscriber only sees rows as they arrive.

mod mock;

pub use mock::MockChangeFeed;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

use crate::error::Result;
use crate::model::Notification;

/// Stream of newly inserted notifications. Dropping it ends the subscription.
pub type NotificationStream = Pin<Box<dyn Stream<Item = Result<Notification>> + Send>>;

/// Change feed strategy
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribe to notifications inserted for `user_id`
    async fn subscribe_notifications(&self, user_id: Uuid) -> Result<NotificationStream>;
}
