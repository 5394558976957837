//! Broadcast-backed change feed for tests and local development

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use super::{ChangeFeed, NotificationStream};
use crate::error::Result;
use crate::model::Notification;

/// Publishes notifications in-process to every matching subscriber
pub struct MockChangeFeed {
    sender: broadcast::Sender<Notification>,
}

impl Default for MockChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    /// Simulate a row insert. Returns the number of live subscriptions.
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl ChangeFeed for MockChangeFeed {
    async fn subscribe_notifications(&self, user_id: Uuid) -> Result<NotificationStream> {
        let receiver = self.sender.subscribe();

        let stream = futures::stream::unfold(receiver, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(n) if n.user_id == user_id => return Some((Ok(n), rx)),
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
