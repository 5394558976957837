//! Notification endpoints and the live websocket relay

use axum::{
    Json,
    extract::{
        Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use uuid::Uuid;

use mailroom_core::ChangeFeed;
use mailroom_core::model::Notification;

use super::Ack;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: u64,
}

pub async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Notification>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    Json(
        user.actions(&state)
            .get_user_notifications(user.id(), limit)
            .await,
    )
}

pub async fn unread_count(State(state): State<AppState>, user: CurrentUser) -> Json<UnreadCount> {
    let count = user
        .actions(&state)
        .get_unread_notification_count(user.id())
        .await;
    Json(UnreadCount { count })
}

pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state)
        .mark_notification_as_read(notification_id)
        .await?;
    Ok(Json(Ack::OK))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Ack>, ApiError> {
    user.actions(&state)
        .mark_all_notifications_as_read(user.id())
        .await?;
    Ok(Json(Ack::OK))
}

/// Frames pushed to the browser
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage<'a> {
    Notification { notification: &'a Notification },

    /// Tell the client to refetch a cached query
    Invalidate { key: &'static str },

    Error { error: String },
}

impl StreamMessage<'_> {
    fn into_message(self) -> Option<Message> {
        serde_json::to_string(&self)
            .ok()
            .map(|text| Message::Text(text.into()))
    }
}

/// Frames sent for one inserted notification row
pub fn frames_for(notification: &Notification) -> Vec<Message> {
    [
        StreamMessage::Notification { notification },
        StreamMessage::Invalidate {
            key: "notifications",
        },
    ]
    .into_iter()
    .filter_map(StreamMessage::into_message)
    .collect()
}

/// WebSocket relay of the user's new notifications
pub async fn stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    user: CurrentUser,
) -> Response {
    let user_id = user.id();
    ws.on_upgrade(move |socket: WebSocket| {
        let (sender, receiver) = socket.split();
        relay(sender, receiver, state.feed, user_id)
    })
}

/// Pump feed rows to `sender` until either side closes. The feed
/// subscription is dropped on return.
async fn relay<Tx, Rx, E>(mut sender: Tx, mut receiver: Rx, feed: Arc<dyn ChangeFeed>, user_id: Uuid)
where
    Tx: Sink<Message> + Unpin,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut feed = match feed.subscribe_notifications(user_id).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!(%user_id, error = %e, "Could not subscribe to notifications");
            if let Some(msg) = (StreamMessage::Error {
                error: e.user_message(),
            })
            .into_message()
            {
                let _ = sender.send(msg).await;
            }
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::info!(%user_id, "Notification stream opened");

    loop {
        tokio::select! {
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(%user_id, error = %e, "WebSocket error");
                    break;
                }
            },
            row = feed.next() => match row {
                Some(Ok(notification)) => {
                    let mut closed = false;
                    for frame in frames_for(&notification) {
                        if sender.send(frame).await.is_err() {
                            closed = true;
                            break;
                        }
                    }
                    if closed {
                        break;
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(%user_id, error = %e, "Notification feed failed");
                    if let Some(msg) = (StreamMessage::Error { error: e.user_message() }).into_message() {
                        let _ = sender.send(msg).await;
                    }
                    break;
                }
                None => break,
            },
        }
    }

    tracing::info!(%user_id, "Notification stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc;
    use mailroom_core::feed::MockChangeFeed;

    fn frame_type(message: &Message) -> String {
        match message {
            Message::Text(text) => {
                let value: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
                value["type"].as_str().unwrap_or_default().to_string()
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_relay_forwards_rows_and_unsubscribes_on_close() {
        let mock = Arc::new(MockChangeFeed::new());
        let feed: Arc<dyn ChangeFeed> = mock.clone();
        let user_id = Uuid::new_v4();

        let (out_tx, mut out_rx) = mpsc::unbounded::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();
        let task = tokio::spawn(relay(out_tx, in_rx, feed, user_id));

        while mock.subscriber_count() == 0 {
            tokio::task::yield_now().await;
        }
        mock.publish(Notification {
            user_id,
            title: "New mail".into(),
            ..Default::default()
        });

        let first = out_rx.next().await.unwrap();
        let second = out_rx.next().await.unwrap();
        assert_eq!(frame_type(&first), "notification");
        assert_eq!(frame_type(&second), "invalidate");

        in_tx.unbounded_send(Ok(Message::Close(None))).unwrap();
        task.await.unwrap();
        assert_eq!(mock.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_relay_stops_when_client_disconnects() {
        let mock = Arc::new(MockChangeFeed::new());
        let feed: Arc<dyn ChangeFeed> = mock.clone();

        let (out_tx, _out_rx) = mpsc::unbounded::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded::<Result<Message, axum::Error>>();
        drop(in_tx);

        relay(out_tx, in_rx, feed, Uuid::new_v4()).await;
        assert_eq!(mock.subscriber_count(), 0);
    }

    #[test]
    fn test_row_becomes_notification_then_invalidate() {
        let notification = Notification {
            title: "New mail".into(),
            ..Default::default()
        };

        let frames: Vec<serde_json::Value> = frames_for(&notification)
            .into_iter()
            .map(|m| match m {
                Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
                other => panic!("unexpected frame {other:?}"),
            })
            .collect();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["type"], "notification");
        assert_eq!(frames[0]["notification"]["title"], "New mail");
        assert_eq!(frames[1]["type"], "invalidate");
        assert_eq!(frames[1]["key"], "notifications");
    }
}
