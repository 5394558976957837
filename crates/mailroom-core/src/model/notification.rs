use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMail,
    ScanReady,
    Forwarded,
    Disposed,
    Payment,
    Subscription,
    #[default]
    #[serde(other)]
    System,
}

/// In-app notification row
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
