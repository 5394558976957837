use serde_json::json;
use uuid::Uuid;

use super::{Actions, procedures};
use crate::error::Result;
use crate::model::{BillingCycle, Subscription, SubscriptionPlan, VirtualAddress};

impl Actions {
    pub async fn get_subscription_plans(&self) -> Vec<SubscriptionPlan> {
        self.invoke_or_default(procedures::GET_SUBSCRIPTION_PLANS, json!({}))
            .await
    }

    /// Mailroom sites customers can pick an address at
    pub async fn get_mailroom_locations(&self) -> Vec<VirtualAddress> {
        self.invoke_or_default(procedures::GET_MAILROOM_LOCATIONS, json!({}))
            .await
    }

    /// Record a pending subscription tied to a gateway payment id
    ///
    /// The webhook relay flips it to active once the gateway confirms.
    pub async fn init_subscription_payment(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        billing_cycle: BillingCycle,
        payment_id: &str,
    ) -> Result<Subscription> {
        self.invoke(
            procedures::INIT_SUBSCRIPTION_PAYMENT,
            json!({
                "input_user_id": user_id,
                "input_plan_id": plan_id,
                "input_billing_cycle": billing_cycle.as_str(),
                "input_payment_id": payment_id,
            }),
        )
        .await
    }

    pub async fn cancel_subscription(&self, user_id: Uuid) -> Result<()> {
        self.invoke_unit(
            procedures::CANCEL_SUBSCRIPTION,
            json!({ "input_user_id": user_id }),
        )
        .await
    }

    /// Hand a verified gateway status to the database
    ///
    /// Keys are the ones the procedure reads straight from the event relay,
    /// without the `input_` prefix.
    pub async fn process_paymongo_webhook(
        &self,
        payment_id: &str,
        payment_status: &str,
        event_type: &str,
    ) -> Result<()> {
        self.invoke_unit(
            procedures::PROCESS_PAYMONGO_WEBHOOK,
            json!({
                "payment_id": payment_id,
                "payment_status": payment_status,
                "event_type": event_type,
            }),
        )
        .await
    }
}
