use serde_json::json;
use uuid::Uuid;

use super::{Actions, procedures};
use crate::error::Result;
use crate::model::Notification;

impl Actions {
    /// Most recent notifications first
    pub async fn get_user_notifications(&self, user_id: Uuid, limit: u32) -> Vec<Notification> {
        self.invoke_or_default(
            procedures::GET_USER_NOTIFICATIONS,
            json!({ "input_user_id": user_id, "input_limit": limit }),
        )
        .await
    }

    pub async fn get_unread_notification_count(&self, user_id: Uuid) -> u64 {
        self.invoke_or_default::<Option<u64>>(
            procedures::GET_UNREAD_NOTIFICATION_COUNT,
            json!({ "input_user_id": user_id }),
        )
        .await
        .unwrap_or_default()
    }

    pub async fn mark_notification_as_read(&self, notification_id: Uuid) -> Result<()> {
        self.invoke_unit(
            procedures::MARK_NOTIFICATION_AS_READ,
            json!({ "input_notification_id": notification_id }),
        )
        .await
    }

    pub async fn mark_all_notifications_as_read(&self, user_id: Uuid) -> Result<()> {
        self.invoke_unit(
            procedures::MARK_ALL_NOTIFICATIONS_AS_READ,
            json!({ "input_user_id": user_id }),
        )
        .await
    }
}
