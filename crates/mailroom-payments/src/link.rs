//! PayMongo Payment Links
//!
//! Shareable one-off payment pages, used for ad-hoc charges such as
//! forwarding fees.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::checkout::{Envelope, PayMongoClient, Resource};
use crate::error::{PaymentError, Result};

/// Request to create a payment link. `amount` is in centavos.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LinkRequest {
    pub amount: i64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// PayMongo's minimum chargeable amount (PHP 100.00)
pub const MIN_LINK_AMOUNT: i64 = 10_000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LinkAttributes {
    amount: i64,
    currency: String,
    description: String,
    remarks: Option<String>,
    status: String,
    checkout_url: String,
    reference_number: String,
    archived: bool,
    livemode: bool,
    payments: Vec<Value>,
}

/// Payment link as returned by PayMongo
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentLink {
    /// PayMongo link ID (`link_...`)
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub remarks: Option<String>,

    /// `unpaid` or `paid`
    pub status: String,
    pub checkout_url: String,
    pub reference_number: String,
    pub archived: bool,
    pub livemode: bool,
    pub payment_count: usize,
}

impl PaymentLink {
    pub fn is_paid(&self) -> bool {
        self.status == "paid"
    }
}

impl From<Resource<LinkAttributes>> for PaymentLink {
    fn from(resource: Resource<LinkAttributes>) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            amount: attrs.amount,
            currency: attrs.currency,
            description: attrs.description,
            remarks: attrs.remarks,
            status: attrs.status,
            checkout_url: attrs.checkout_url,
            reference_number: attrs.reference_number,
            archived: attrs.archived,
            livemode: attrs.livemode,
            payment_count: attrs.payments.len(),
        }
    }
}

impl PayMongoClient {
    /// Create a shareable payment link
    pub async fn create_link(&self, request: &LinkRequest) -> Result<PaymentLink> {
        if request.amount < MIN_LINK_AMOUNT {
            return Err(PaymentError::Api {
                status: 400,
                detail: format!("amount must be at least {MIN_LINK_AMOUNT} centavos"),
            });
        }

        let resource: Resource<LinkAttributes> = self
            .send(Method::POST, "links", Some(&Envelope::new(request)))
            .await?;

        tracing::info!(link_id = %resource.id, amount = request.amount, "Created PayMongo link");
        Ok(resource.into())
    }

    /// Retrieve a payment link by id
    pub async fn retrieve_link(&self, id: &str) -> Result<PaymentLink> {
        let resource: Resource<LinkAttributes> = self
            .send::<(), _>(Method::GET, &format!("links/{id}"), None)
            .await?;
        Ok(resource.into())
    }
}
