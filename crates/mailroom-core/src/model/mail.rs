//! Mail item shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Provider-managed address a customer receives mail at
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualAddress {
    pub id: Uuid,
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

impl VirtualAddress {
    /// Single-line rendering for labels and emails
    pub fn one_line(&self) -> String {
        let mut parts = vec![self.line1.as_str()];
        if let Some(line2) = self.line2.as_deref().filter(|l| !l.is_empty()) {
            parts.push(line2);
        }
        parts.push(self.city.as_str());
        if let Some(region) = self.region.as_deref().filter(|r| !r.is_empty()) {
            parts.push(region);
        }
        parts.push(self.postal_code.as_str());
        parts.push(self.country.as_str());
        parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailItemKind {
    #[default]
    Letter,
    Parcel,
    Document,
    #[serde(other)]
    Other,
}

/// Lifecycle of a mail item. Transitions are enforced by the database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailItemStatus {
    #[default]
    Received,
    ScanRequested,
    Scanned,
    ForwardRequested,
    Forwarded,
    DisposalRequested,
    Disposed,
    Archived,
    #[serde(other)]
    Unknown,
}

impl MailItemStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Received => "received",
            Self::ScanRequested => "scan_requested",
            Self::Scanned => "scanned",
            Self::ForwardRequested => "forward_requested",
            Self::Forwarded => "forwarded",
            Self::DisposalRequested => "disposal_requested",
            Self::Disposed => "disposed",
            Self::Archived => "archived",
            Self::Unknown => "unknown",
        }
    }

    /// Item is no longer physically held by the mailroom
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Forwarded | Self::Disposed)
    }
}

/// A single piece of physical mail
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailItem {
    pub id: Uuid,
    pub mailbox_id: Uuid,
    pub sender: Option<String>,
    pub description: Option<String>,
    pub kind: MailItemKind,
    pub status: MailItemStatus,
    pub received_at: Option<DateTime<Utc>>,
    pub is_read: bool,
    pub is_archived: bool,
    pub scan_url: Option<String>,
    pub forward_address: Option<String>,
    pub tracking_number: Option<String>,
}

/// Counters shown on the mailbox overview
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailroomStats {
    pub total: u64,
    pub unread: u64,
    pub archived: u64,
    pub pending_requests: u64,
}

/// Mailbox contents for one customer
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailroomData {
    pub items: Vec<MailItem>,
    pub stats: MailroomStats,
    pub location: Option<VirtualAddress>,
}

/// Destination for a forwarding request
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForwardRequest {
    pub address: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Item registered by staff when it arrives at the mailroom
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewMailItem {
    pub mailbox_id: Uuid,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: MailItemKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_status_decodes() {
        let item: MailItem = serde_json::from_value(serde_json::json!({
            "status": "lost_in_transit",
            "kind": "parcel",
            "is_read": true
        }))
        .unwrap();

        assert_eq!(item.status, MailItemStatus::Unknown);
        assert_eq!(item.kind, MailItemKind::Parcel);
        assert!(item.is_read);
        assert!(!item.is_archived);
    }

    #[test]
    fn test_address_one_line_skips_empty_parts() {
        let address = VirtualAddress {
            name: "Makati Hub".into(),
            line1: "123 Ayala Ave".into(),
            line2: Some(String::new()),
            city: "Makati".into(),
            region: Some("Metro Manila".into()),
            postal_code: "1226".into(),
            country: "PH".into(),
            ..Default::default()
        };

        assert_eq!(
            address.one_line(),
            "123 Ayala Ave, Makati, Metro Manila, 1226, PH"
        );
    }
}
