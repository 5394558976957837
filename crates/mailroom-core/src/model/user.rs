//! Account shapes returned by the user procedures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::Subscription;
use super::mail::VirtualAddress;

/// Account role
///
/// Unknown role strings from the database fall back to `Customer`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum UserRole {
    #[default]
    Customer,
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }

    /// Staff and admins may use the back office
    pub fn is_back_office(&self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            "staff" => Self::Staff,
            _ => Self::Customer,
        }
    }
}

/// Customer profile
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Display name, falling back to the email address
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Identity verification state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    NotSubmitted,
    Pending,
    Verified,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// Identity verification record
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KycInfo {
    pub status: KycStatus,
    pub id_type: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Mailbox assigned to a customer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailroomAssignment {
    pub id: Uuid,
    pub mailbox_code: String,
    pub location: VirtualAddress,
}

/// Everything the dashboard shows about the signed-in customer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFullDetails {
    pub user: UserProfile,
    pub kyc: Option<KycInfo>,
    pub subscription: Option<Subscription>,
    pub mailroom: Option<MailroomAssignment>,
}

/// Derived permissions struct cached in the `auth_data` cookie
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAuthData {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub has_active_subscription: bool,
    pub kyc_status: KycStatus,
    pub mailroom_id: Option<Uuid>,
}

/// Partial profile update
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.avatar_url.is_none()
    }
}

/// Identity documents submitted for review
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KycSubmission {
    pub id_type: String,
    pub id_number: String,
    pub id_front_url: String,
    #[serde(default)]
    pub id_back_url: Option<String>,
    #[serde(default)]
    pub selfie_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_defaults_to_customer() {
        let role: UserRole = serde_json::from_str("\"superuser\"").unwrap();
        assert_eq!(role, UserRole::Customer);

        let role: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }

    #[test]
    fn test_full_details_tolerates_missing_fields() {
        let details: UserFullDetails = serde_json::from_value(serde_json::json!({
            "user": { "email": "ana@example.com", "first_name": "Ana" }
        }))
        .unwrap();

        assert_eq!(details.user.display_name(), "Ana");
        assert!(details.subscription.is_none());
        assert_eq!(details.user.role, UserRole::Customer);
    }
}
