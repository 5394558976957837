//! Subscription and plan shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Billing interval
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Annual,
}

impl BillingCycle {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Pending,
    Expired,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A customer's subscription record
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscription {
    pub id: Uuid,
    pub plan_id: Option<Uuid>,
    pub plan_name: Option<String>,
    pub status: SubscriptionStatus,
    pub billing_cycle: BillingCycle,
    pub current_period_end: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub payment_id: Option<String>,
}

impl Subscription {
    /// Active and, when a period end is known, not past it
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active
            && self.current_period_end.is_none_or(|end| end > now)
    }
}

/// Plan offered on the pricing page. Prices are in centavos.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub monthly_price: i64,
    pub annual_price: i64,
    pub features: Vec<String>,
}

impl SubscriptionPlan {
    pub fn price_for(&self, cycle: BillingCycle) -> i64 {
        match cycle {
            BillingCycle::Monthly => self.monthly_price,
            BillingCycle::Annual => self.annual_price,
        }
    }
}

/// Counters for the admin dashboard
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminDashboardStats {
    pub total_users: u64,
    pub active_subscriptions: u64,
    pub mail_received_today: u64,
    pub pending_scans: u64,
    pub pending_forwards: u64,
    pub pending_disposals: u64,
    pub pending_kyc: u64,
}
