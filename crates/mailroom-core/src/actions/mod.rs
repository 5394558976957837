//! Action Wrappers
//!
//! Each action invokes exactly one remote procedure and maps its result.
//! Error policy per call site:
//!
//! - mutations and identity reads log and propagate the error
//! - listing reads log and fall back to an empty/default value

mod admin;
mod billing;
mod mail;
mod notifications;
mod users;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::rpc::{Caller, RpcClient, decode};

/// Procedure names
pub mod procedures {
    pub const GET_USER_FULL_DETAILS: &str = "get_user_full_details";
    pub const GET_USER_AUTH_DATA: &str = "get_user_auth_data";
    pub const UPDATE_USER_PROFILE: &str = "update_user_profile";
    pub const SUBMIT_KYC: &str = "submit_kyc";

    pub const GET_MAILROOM_DATA: &str = "get_mailroom_data";
    pub const GET_MAIL_ITEM: &str = "get_mail_item";
    pub const MARK_MAIL_ITEM_AS_READ: &str = "mark_mail_item_as_read";
    pub const MARK_MAIL_ITEM_AS_UNREAD: &str = "mark_mail_item_as_unread";
    pub const ARCHIVE_MAIL_ITEM: &str = "archive_mail_item";
    pub const UNARCHIVE_MAIL_ITEM: &str = "unarchive_mail_item";
    pub const REQUEST_MAIL_ITEM_SCAN: &str = "request_mail_item_scan";
    pub const REQUEST_MAIL_ITEM_FORWARD: &str = "request_mail_item_forward";
    pub const REQUEST_MAIL_ITEM_DISPOSAL: &str = "request_mail_item_disposal";

    pub const GET_USER_NOTIFICATIONS: &str = "get_user_notifications";
    pub const GET_UNREAD_NOTIFICATION_COUNT: &str = "get_unread_notification_count";
    pub const MARK_NOTIFICATION_AS_READ: &str = "mark_notification_as_read";
    pub const MARK_ALL_NOTIFICATIONS_AS_READ: &str = "mark_all_notifications_as_read";

    pub const GET_SUBSCRIPTION_PLANS: &str = "get_subscription_plans";
    pub const INIT_SUBSCRIPTION_PAYMENT: &str = "init_subscription_payment";
    pub const CANCEL_SUBSCRIPTION: &str = "cancel_subscription";
    pub const GET_MAILROOM_LOCATIONS: &str = "get_mailroom_locations";
    pub const PROCESS_PAYMONGO_WEBHOOK: &str = "process_paymongo_webhook";

    pub const ADMIN_GET_DASHBOARD_STATS: &str = "admin_get_dashboard_stats";
    pub const ADMIN_LIST_USERS: &str = "admin_list_users";
    pub const ADMIN_REGISTER_MAIL_ITEM: &str = "admin_register_mail_item";
    pub const ADMIN_UPDATE_MAIL_ITEM_STATUS: &str = "admin_update_mail_item_status";
    pub const ADMIN_ATTACH_SCAN: &str = "admin_attach_scan";
}

/// Action surface bound to one caller
#[derive(Clone)]
pub struct Actions {
    rpc: Arc<dyn RpcClient>,
    caller: Caller,
}

impl Actions {
    pub fn new(rpc: Arc<dyn RpcClient>, caller: Caller) -> Self {
        Self { rpc, caller }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    /// Invoke and decode, propagating failures
    async fn invoke<T: DeserializeOwned>(&self, function: &str, params: Value) -> Result<T> {
        let value = self.invoke_raw(function, params).await?;
        decode(function, value)
    }

    /// Invoke a procedure whose result is ignored
    async fn invoke_unit(&self, function: &str, params: Value) -> Result<()> {
        self.invoke_raw(function, params).await.map(|_| ())
    }

    /// Invoke and decode, logging failures and falling back to the default
    async fn invoke_or_default<T: DeserializeOwned + Default>(
        &self,
        function: &str,
        params: Value,
    ) -> T {
        match self.invoke(function, params).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(rpc = %function, error = %e, "Falling back to default result");
                T::default()
            }
        }
    }

    async fn invoke_raw(&self, function: &str, params: Value) -> Result<Value> {
        tracing::debug!(rpc = %function, service = self.caller.is_service(), "Calling procedure");
        self.rpc
            .call(&self.caller, function, params)
            .await
            .inspect_err(|e| tracing::error!(rpc = %function, error = %e, "Procedure failed"))
    }
}
