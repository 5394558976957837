//! PayMongo Webhook Handling
//!
//! Verifies the delivery, maps the event type to a tri-state payment status
//! and relays it to the database. The subscription rows themselves are owned
//! by the `process_paymongo_webhook` procedure.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use mailroom_core::{Actions, Caller, RpcClient};

use crate::error::{PaymentError, Result};
use crate::signature::verify_signature;

/// Status relayed to the database
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
    Pending,
}

impl PaymentStatus {
    /// Map a PayMongo event type; `None` for events this service ignores
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "checkout_session.payment.paid" | "link.payment.paid" | "payment.paid" => {
                Some(Self::Succeeded)
            }
            "payment.failed" => Some(Self::Failed),
            "source.chargeable" => Some(Self::Pending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a PayMongo event the relay needs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayMongoEvent {
    /// `evt_...`
    pub id: String,
    pub event_type: String,
    /// Id of the resource the event is about (`cs_...`, `pay_...`, `link_...`)
    pub resource_id: String,
    pub livemode: bool,
}

#[derive(Deserialize)]
struct EventBody {
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    #[serde(default)]
    id: String,
    attributes: EventAttributes,
}

#[derive(Deserialize)]
struct EventAttributes {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    livemode: bool,
    #[serde(default)]
    data: Value,
}

impl PayMongoEvent {
    /// Parse `data.attributes.{type,data.id}` out of a raw delivery
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let body: EventBody =
            serde_json::from_slice(payload).map_err(|e| PaymentError::WebhookParse(e.to_string()))?;
        let attrs = body.data.attributes;

        let resource_id = attrs
            .data
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id: body.data.id,
            event_type: attrs.event_type,
            resource_id,
            livemode: attrs.livemode,
        })
    }
}

/// Result of handling one delivery
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Status forwarded to the database
    Relayed {
        payment_id: String,
        status: PaymentStatus,
        event_type: String,
    },

    /// Event type this service does not act on
    Ignored { event_type: String },
}

impl WebhookOutcome {
    pub fn status(&self) -> Option<PaymentStatus> {
        match self {
            Self::Relayed { status, .. } => Some(*status),
            Self::Ignored { .. } => None,
        }
    }
}

/// Webhook handler
pub struct WebhookHandler {
    actions: Actions,
}

impl WebhookHandler {
    /// Relay calls run with service credentials; a webhook carries no user session
    pub fn new(rpc: Arc<dyn RpcClient>) -> Self {
        Self {
            actions: Actions::new(rpc, Caller::Service),
        }
    }

    /// Verify, parse and relay one delivery
    pub async fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        secret: &str,
    ) -> Result<WebhookOutcome> {
        let signature = signature
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PaymentError::WebhookSignature("missing signature header".into()))?;
        verify_signature(signature, payload, secret)?;

        let event = PayMongoEvent::parse(payload)?;
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Processing PayMongo webhook"
        );

        let Some(status) = PaymentStatus::from_event_type(&event.event_type) else {
            tracing::debug!(event_type = %event.event_type, "Unhandled webhook event");
            return Ok(WebhookOutcome::Ignored {
                event_type: event.event_type,
            });
        };

        if event.resource_id.is_empty() {
            return Err(PaymentError::WebhookParse(
                "event carries no resource id".into(),
            ));
        }

        self.actions
            .process_paymongo_webhook(&event.resource_id, status.as_str(), &event.event_type)
            .await?;

        tracing::info!(
            payment_id = %event.resource_id,
            %status,
            "Relayed payment status"
        );

        Ok(WebhookOutcome::Relayed {
            payment_id: event.resource_id,
            status,
            event_type: event.event_type,
        })
    }
}
