//! PayMongo Checkout Integration
//!
//! Hosted checkout sessions: the customer is redirected to PayMongo's page
//! and comes back to `success_url`/`cancel_url`. Settlement is reported
//! separately through the webhook.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{PaymentError, Result};

/// PayMongo API base URL
pub const PAYMONGO_API_BASE: &str = "https://api.paymongo.com/v1";

/// Currency for every amount this service charges
pub const CURRENCY: &str = "PHP";

/// PayMongo REST client
pub struct PayMongoClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    webhook_secret: String,
}

impl PayMongoClient {
    /// Create a new PayMongo client
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: PAYMONGO_API_BASE.to_string(),
            secret_key: secret_key.to_string(),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("PAYMONGO_SECRET_KEY")
            .map_err(|_| PaymentError::Config("PAYMONGO_SECRET_KEY not set".into()))?;
        let webhook_secret = std::env::var("PAYMONGO_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::Config("PAYMONGO_WEBHOOK_SECRET not set".into()))?;

        Ok(Self::new(&secret_key, &webhook_secret))
    }

    /// Point at a different API host (sandbox proxies, tests)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Get the webhook secret
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }

    /// Create a hosted checkout session
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession> {
        let resource: Resource<CheckoutSessionAttributes> = self
            .send(Method::POST, "checkout_sessions", Some(&Envelope::new(request)))
            .await?;

        tracing::info!(session_id = %resource.id, "Created PayMongo checkout session");
        Ok(resource.into())
    }

    /// Retrieve a checkout session by id
    pub async fn retrieve_checkout_session(&self, id: &str) -> Result<CheckoutSession> {
        let resource: Resource<CheckoutSessionAttributes> = self
            .send::<(), _>(Method::GET, &format!("checkout_sessions/{id}"), None)
            .await?;
        Ok(resource.into())
    }

    /// Send a request with basic auth and unwrap the `data` envelope
    pub(crate) async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self
            .http
            .request(method, &url)
            .basic_auth(&self.secret_key, Some(""));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let detail = match response.json::<ErrorBody>().await {
                Ok(body) => body.detail(),
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            tracing::warn!(status = status.as_u16(), %detail, path, "PayMongo request rejected");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                detail,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

/// JSON:API style `{"data": ...}` wrapper
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Request body `{"data": {"attributes": ...}}`
#[derive(Debug, Serialize)]
pub(crate) struct Attributes<'a, T> {
    pub attributes: &'a T,
}

impl<'a, T> Envelope<Attributes<'a, T>> {
    pub(crate) fn new(attributes: &'a T) -> Self {
        Self {
            data: Attributes { attributes },
        }
    }
}

/// Response resource `{"id", "type", "attributes"}`
#[derive(Debug, Deserialize)]
pub(crate) struct Resource<A> {
    pub id: String,
    pub attributes: A,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

impl ErrorBody {
    fn detail(self) -> String {
        let details: Vec<String> = self
            .errors
            .into_iter()
            .map(|e| match (e.code, e.detail) {
                (Some(code), Some(detail)) => format!("{code}: {detail}"),
                (None, Some(detail)) => detail,
                (Some(code), None) => code,
                (None, None) => "unknown error".into(),
            })
            .collect();
        if details.is_empty() {
            "unknown error".into()
        } else {
            details.join("; ")
        }
    }
}

/// One purchasable line. `amount` is in centavos.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub amount: i64,
    pub currency: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, amount: i64) -> Self {
        Self {
            name: name.into(),
            amount,
            currency: CURRENCY.to_string(),
            quantity: 1,
            description: None,
        }
    }
}

/// Request to create a checkout session
#[derive(Clone, Debug, Serialize)]
pub struct CheckoutRequest {
    pub line_items: Vec<LineItem>,
    pub payment_method_types: Vec<String>,
    pub success_url: String,
    pub cancel_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    pub send_email_receipt: bool,
    pub show_description: bool,
    pub show_line_items: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl CheckoutRequest {
    /// Single-item checkout with the default payment methods
    pub fn single(item: LineItem, success_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        let description = item.description.clone();
        Self {
            show_description: description.is_some(),
            description,
            line_items: vec![item],
            payment_method_types: default_payment_methods(),
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
            reference_number: None,
            send_email_receipt: true,
            show_line_items: true,
            metadata: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    /// Sum of all lines in centavos
    pub fn total(&self) -> i64 {
        self.line_items
            .iter()
            .map(|l| l.amount * i64::from(l.quantity))
            .sum()
    }
}

/// Payment methods offered on hosted pages
pub fn default_payment_methods() -> Vec<String> {
    ["card", "gcash", "paymaya", "grab_pay"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CheckoutSessionAttributes {
    checkout_url: String,
    status: String,
    reference_number: Option<String>,
    line_items: Vec<LineItem>,
    payment_intent: Option<Value>,
    payments: Vec<Value>,
    metadata: Option<HashMap<String, String>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    created_at: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    paid_at: Option<DateTime<Utc>>,
}

/// Checkout session as returned by PayMongo
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// PayMongo session ID (`cs_...`)
    pub id: String,

    /// URL to redirect the customer to
    pub checkout_url: String,

    /// `active`, `expired`, ...
    pub status: String,

    pub reference_number: Option<String>,
    pub line_items: Vec<LineItem>,
    pub metadata: HashMap<String, String>,

    /// Payment intent id, when one was attached
    pub payment_intent_id: Option<String>,

    /// At least one payment was recorded against the session
    pub paid: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Resource<CheckoutSessionAttributes>> for CheckoutSession {
    fn from(resource: Resource<CheckoutSessionAttributes>) -> Self {
        let attrs = resource.attributes;
        Self {
            id: resource.id,
            checkout_url: attrs.checkout_url,
            status: attrs.status,
            reference_number: attrs.reference_number,
            line_items: attrs.line_items,
            metadata: attrs.metadata.unwrap_or_default(),
            payment_intent_id: attrs
                .payment_intent
                .as_ref()
                .and_then(|pi| pi.get("id"))
                .and_then(Value::as_str)
                .map(String::from),
            paid: !attrs.payments.is_empty() || attrs.paid_at.is_some(),
            created_at: attrs.created_at,
            paid_at: attrs.paid_at,
        }
    }
}
