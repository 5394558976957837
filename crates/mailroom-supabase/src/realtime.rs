//! Supabase Realtime Change Feed
//!
//! Speaks the Phoenix channel protocol (JSON, `vsn=1.0.0`) over a websocket
//! and surfaces `INSERT`s on `public.notifications` as a stream. Each
//! subscription owns one socket; dropping the stream closes it.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

use mailroom_core::model::Notification;
use mailroom_core::{ChangeFeed, MailroomError, NotificationStream, Result};

use crate::config::SupabaseConfig;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const HEARTBEAT_SECS: u64 = 25;
const NOTIFICATIONS_TABLE: &str = "notifications";

/// Realtime feed configuration
#[derive(Clone, Debug)]
pub struct RealtimeFeed {
    config: SupabaseConfig,
    heartbeat: Duration,
}

impl RealtimeFeed {
    pub fn new(config: SupabaseConfig) -> Self {
        Self {
            config,
            heartbeat: Duration::from_secs(HEARTBEAT_SECS),
        }
    }

    #[must_use]
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }
}

#[async_trait]
impl ChangeFeed for RealtimeFeed {
    async fn subscribe_notifications(&self, user_id: Uuid) -> Result<NotificationStream> {
        let key = &self.config.service_role_key;
        let url = self.config.realtime_url(key);

        let (socket, _) = connect_async(url.as_str())
            .await
            .map_err(|e| MailroomError::Feed(e.to_string()))?;
        let (mut sink, source) = socket.split();

        let topic = notification_topic(user_id);
        sink.send(Message::text(join_message(&topic, user_id, key).to_string()))
            .await
            .map_err(|e| MailroomError::Feed(e.to_string()))?;

        tracing::info!(%user_id, %topic, "Joined realtime channel");

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(pump(sink, source, tx, topic, self.heartbeat));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Forward decoded rows until the subscriber goes away or the socket ends
async fn pump(
    mut sink: SplitSink<Socket, Message>,
    mut source: SplitStream<Socket>,
    tx: mpsc::Sender<Result<Notification>>,
    topic: String,
    heartbeat: Duration,
) {
    let mut ticker = tokio::time::interval(heartbeat);
    ticker.tick().await;
    let mut next_ref: u64 = 2;

    loop {
        tokio::select! {
            () = tx.closed() => {
                tracing::debug!(%topic, "Subscriber dropped, leaving channel");
                let _ = sink.send(Message::text(leave_message(&topic, next_ref).to_string())).await;
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            _ = ticker.tick() => {
                let frame = heartbeat_message(next_ref).to_string();
                next_ref += 1;
                if let Err(e) = sink.send(Message::text(frame)).await {
                    let _ = tx.send(Err(MailroomError::Feed(e.to_string()))).await;
                    break;
                }
            }
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => match decode_frame(&topic, text.as_str()) {
                    Some(Frame::Row(notification)) => {
                        if tx.send(Ok(*notification)).await.is_err() {
                            break;
                        }
                    }
                    Some(Frame::Error(reason)) => {
                        tracing::warn!(%topic, %reason, "Realtime channel error");
                        let _ = tx.send(Err(MailroomError::Feed(reason))).await;
                        break;
                    }
                    Some(Frame::Closed) => break,
                    None => {}
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = tx.send(Err(MailroomError::Feed(e.to_string()))).await;
                    break;
                }
            },
        }
    }

    tracing::debug!(%topic, "Realtime pump stopped");
}

fn notification_topic(user_id: Uuid) -> String {
    format!("realtime:{NOTIFICATIONS_TABLE}:{user_id}")
}

fn join_message(topic: &str, user_id: Uuid, access_token: &str) -> Value {
    json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": "INSERT",
                    "schema": "public",
                    "table": NOTIFICATIONS_TABLE,
                    "filter": format!("user_id=eq.{user_id}"),
                }],
                "private": false,
            },
            "access_token": access_token,
        },
        "ref": "1",
        "join_ref": "1",
    })
}

fn heartbeat_message(msg_ref: u64) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref.to_string(),
    })
}

fn leave_message(topic: &str, msg_ref: u64) -> Value {
    json!({
        "topic": topic,
        "event": "phx_leave",
        "payload": {},
        "ref": msg_ref.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Frame of interest to the subscriber
#[derive(Debug, PartialEq)]
enum Frame {
    Row(Box<Notification>),
    Error(String),
    Closed,
}

fn decode_frame(topic: &str, text: &str) -> Option<Frame> {
    let message: PhoenixMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring undecodable realtime frame");
            return None;
        }
    };

    if message.topic != topic {
        return None;
    }

    let payload = message.payload;
    match message.event.as_str() {
        "postgres_changes" => {
            let data = payload.get("data")?;
            if data.get("type").and_then(Value::as_str) != Some("INSERT") {
                return None;
            }
            let record = data.get("record")?.clone();
            match serde_json::from_value::<Notification>(record) {
                Ok(n) => Some(Frame::Row(Box::new(n))),
                Err(e) => {
                    tracing::warn!(error = %e, "Notification row did not decode");
                    None
                }
            }
        }
        "phx_reply" | "system" if payload.get("status").and_then(Value::as_str) == Some("error") => {
            let reason = payload
                .pointer("/response/reason")
                .or_else(|| payload.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("subscription rejected")
                .to_string();
            Some(Frame::Error(reason))
        }
        "phx_error" => Some(Frame::Error("channel crashed".into())),
        "phx_close" => Some(Frame::Closed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";

    fn topic() -> String {
        notification_topic(USER.parse().unwrap())
    }

    #[test]
    fn test_join_message_filters_by_user() {
        let user_id: Uuid = USER.parse().unwrap();
        let msg = join_message(&topic(), user_id, "key");

        assert_eq!(msg["event"], "phx_join");
        assert_eq!(msg["topic"], format!("realtime:notifications:{USER}"));
        let change = &msg["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["table"], "notifications");
        assert_eq!(change["filter"], format!("user_id=eq.{USER}"));
    }

    #[test]
    fn test_insert_frame_decodes_row() {
        let frame = json!({
            "topic": topic(),
            "event": "postgres_changes",
            "payload": {
                "data": {
                    "type": "INSERT",
                    "schema": "public",
                    "table": "notifications",
                    "record": { "user_id": USER, "title": "New mail", "message": "A letter arrived" }
                },
                "ids": [1]
            },
            "ref": null
        });

        match decode_frame(&topic(), &frame.to_string()) {
            Some(Frame::Row(n)) => assert_eq!(n.title, "New mail"),
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn test_other_topics_and_events_are_ignored() {
        let foreign = json!({ "topic": "realtime:other", "event": "phx_close", "payload": {} });
        assert!(decode_frame(&topic(), &foreign.to_string()).is_none());

        let ok_reply = json!({
            "topic": topic(),
            "event": "phx_reply",
            "payload": { "status": "ok", "response": {} }
        });
        assert!(decode_frame(&topic(), &ok_reply.to_string()).is_none());

        assert!(decode_frame(&topic(), "not json").is_none());
    }

    #[test]
    fn test_rejected_join_is_an_error() {
        let reply = json!({
            "topic": topic(),
            "event": "phx_reply",
            "payload": { "status": "error", "response": { "reason": "Invalid JWT" } }
        });
        assert_eq!(
            decode_frame(&topic(), &reply.to_string()),
            Some(Frame::Error("Invalid JWT".into()))
        );
    }
}
