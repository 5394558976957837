//! Back-office actions. Callers must already hold a staff or admin role.

use serde_json::json;
use uuid::Uuid;

use super::{Actions, procedures};
use crate::error::{MailroomError, Result};
use crate::model::{AdminDashboardStats, MailItem, MailItemStatus, NewMailItem, UserProfile};

/// Largest page the user listing will request
pub const MAX_PAGE_SIZE: u32 = 100;

impl Actions {
    pub async fn admin_get_dashboard_stats(&self) -> Result<AdminDashboardStats> {
        self.invoke(procedures::ADMIN_GET_DASHBOARD_STATS, json!({}))
            .await
    }

    pub async fn admin_list_users(
        &self,
        page: u32,
        per_page: u32,
        search: Option<&str>,
    ) -> Result<Vec<UserProfile>> {
        let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        self.invoke(
            procedures::ADMIN_LIST_USERS,
            json!({
                "input_page": page.max(1),
                "input_per_page": per_page,
                "input_search": search,
            }),
        )
        .await
    }

    /// Log a newly received item; the database notifies the mailbox owner
    pub async fn admin_register_mail_item(&self, item: &NewMailItem) -> Result<MailItem> {
        self.invoke(
            procedures::ADMIN_REGISTER_MAIL_ITEM,
            json!({
                "input_mailbox_id": item.mailbox_id,
                "input_sender": item.sender,
                "input_description": item.description,
                "input_kind": item.kind,
            }),
        )
        .await
    }

    pub async fn admin_update_mail_item_status(
        &self,
        item_id: Uuid,
        status: MailItemStatus,
        note: Option<&str>,
    ) -> Result<()> {
        if status == MailItemStatus::Unknown {
            return Err(MailroomError::InvalidInput("Unknown mail item status".into()));
        }

        self.invoke_unit(
            procedures::ADMIN_UPDATE_MAIL_ITEM_STATUS,
            json!({
                "input_mail_item_id": item_id,
                "input_status": status.as_str(),
                "input_note": note,
            }),
        )
        .await
    }

    pub async fn admin_attach_scan(&self, item_id: Uuid, scan_url: &str) -> Result<()> {
        if scan_url.trim().is_empty() {
            return Err(MailroomError::InvalidInput("Scan URL is required".into()));
        }

        self.invoke_unit(
            procedures::ADMIN_ATTACH_SCAN,
            json!({ "input_mail_item_id": item_id, "input_scan_url": scan_url }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{Caller, MockRpcClient};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_users_clamps_paging() {
        let rpc = Arc::new(MockRpcClient::new().with_response(procedures::ADMIN_LIST_USERS, json!([])));
        let actions = Actions::new(rpc.clone(), Caller::Service);

        actions.admin_list_users(0, 5000, Some("  ")).await.unwrap();

        let params = &rpc.calls_to(procedures::ADMIN_LIST_USERS)[0].params;
        assert_eq!(params["input_page"], 1);
        assert_eq!(params["input_per_page"], MAX_PAGE_SIZE);
        assert!(params["input_search"].is_null());
    }

    #[tokio::test]
    async fn test_status_update_sends_wire_name() {
        let rpc = Arc::new(MockRpcClient::new());
        let actions = Actions::new(rpc.clone(), Caller::Service);

        actions
            .admin_update_mail_item_status(Uuid::new_v4(), MailItemStatus::ForwardRequested, None)
            .await
            .unwrap();

        let params = &rpc.calls_to(procedures::ADMIN_UPDATE_MAIL_ITEM_STATUS)[0].params;
        assert_eq!(params["input_status"], "forward_requested");
    }

    #[tokio::test]
    async fn test_blank_scan_url_rejected() {
        let rpc = Arc::new(MockRpcClient::new());
        let actions = Actions::new(rpc.clone(), Caller::Service);

        assert!(actions.admin_attach_scan(Uuid::new_v4(), " ").await.is_err());
        assert!(rpc.calls().is_empty());
    }
}
