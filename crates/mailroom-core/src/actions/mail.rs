use serde_json::json;
use uuid::Uuid;

use super::{Actions, procedures};
use crate::error::Result;
use crate::model::{ForwardRequest, MailItem, MailroomData};

impl Actions {
    /// Mailbox contents. Failures degrade to an empty mailbox.
    pub async fn get_mailroom_data(&self, user_id: Uuid) -> MailroomData {
        self.invoke_or_default(
            procedures::GET_MAILROOM_DATA,
            json!({ "input_user_id": user_id }),
        )
        .await
    }

    pub async fn get_mail_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<MailItem>> {
        self.invoke(
            procedures::GET_MAIL_ITEM,
            json!({ "input_user_id": user_id, "input_mail_item_id": item_id }),
        )
        .await
    }

    pub async fn mark_mail_item_as_read(&self, item_id: Uuid) -> Result<()> {
        self.item_action(procedures::MARK_MAIL_ITEM_AS_READ, item_id).await
    }

    pub async fn mark_mail_item_as_unread(&self, item_id: Uuid) -> Result<()> {
        self.item_action(procedures::MARK_MAIL_ITEM_AS_UNREAD, item_id).await
    }

    pub async fn archive_mail_item(&self, item_id: Uuid) -> Result<()> {
        self.item_action(procedures::ARCHIVE_MAIL_ITEM, item_id).await
    }

    pub async fn unarchive_mail_item(&self, item_id: Uuid) -> Result<()> {
        self.item_action(procedures::UNARCHIVE_MAIL_ITEM, item_id).await
    }

    pub async fn request_mail_item_scan(&self, item_id: Uuid) -> Result<()> {
        self.item_action(procedures::REQUEST_MAIL_ITEM_SCAN, item_id).await
    }

    pub async fn request_mail_item_disposal(&self, item_id: Uuid) -> Result<()> {
        self.item_action(procedures::REQUEST_MAIL_ITEM_DISPOSAL, item_id)
            .await
    }

    pub async fn request_mail_item_forward(
        &self,
        item_id: Uuid,
        request: &ForwardRequest,
    ) -> Result<()> {
        self.invoke_unit(
            procedures::REQUEST_MAIL_ITEM_FORWARD,
            json!({
                "input_mail_item_id": item_id,
                "input_forward_address": request.address,
                "input_recipient_name": request.recipient_name,
                "input_notes": request.notes,
            }),
        )
        .await
    }

    async fn item_action(&self, function: &str, item_id: Uuid) -> Result<()> {
        self.invoke_unit(function, json!({ "input_mail_item_id": item_id }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MailItemStatus;
    use crate::rpc::{Caller, MockRpcClient};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_mailroom_data_defaults_on_failure() {
        let rpc = Arc::new(MockRpcClient::new().with_failure(procedures::GET_MAILROOM_DATA));
        let actions = Actions::new(rpc.clone(), Caller::Service);

        let data = actions.get_mailroom_data(Uuid::new_v4()).await;
        assert!(data.items.is_empty());
        assert_eq!(data.stats.total, 0);
        assert_eq!(rpc.call_count(procedures::GET_MAILROOM_DATA), 1);
    }

    #[tokio::test]
    async fn test_mailroom_data_decodes_items() {
        let rpc = Arc::new(MockRpcClient::new().with_response(
            procedures::GET_MAILROOM_DATA,
            json!({
                "items": [{ "sender": "BIR", "status": "scanned" }],
                "stats": { "total": 1, "unread": 1 }
            }),
        ));
        let actions = Actions::new(rpc, Caller::Service);

        let data = actions.get_mailroom_data(Uuid::new_v4()).await;
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].status, MailItemStatus::Scanned);
        assert_eq!(data.stats.unread, 1);
    }

    #[tokio::test]
    async fn test_unread_calls_single_procedure() {
        let rpc = Arc::new(MockRpcClient::new());
        let actions = Actions::new(rpc.clone(), Caller::Service);
        let item_id = Uuid::new_v4();

        actions.mark_mail_item_as_unread(item_id).await.unwrap();

        let calls = rpc.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].function, "mark_mail_item_as_unread");
        assert_eq!(calls[0].params, json!({ "input_mail_item_id": item_id }));
    }

    #[tokio::test]
    async fn test_forward_request_params() {
        let rpc = Arc::new(MockRpcClient::new());
        let actions = Actions::new(rpc.clone(), Caller::Service);

        actions
            .request_mail_item_forward(
                Uuid::new_v4(),
                &ForwardRequest {
                    address: "88 Rizal St, Cebu City".into(),
                    recipient_name: Some("Ana Cruz".into()),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let params = &rpc.calls_to(procedures::REQUEST_MAIL_ITEM_FORWARD)[0].params;
        assert_eq!(params["input_forward_address"], "88 Rizal St, Cebu City");
        assert!(params["input_notes"].is_null());
    }
}
