//! # mailroom-payments
//!
//! PayMongo integration for the mailroom service.
//!
//! ## Flows
//!
//! ```text
//! ┌─────────────┐  checkout   ┌──────────────────┐  redirect  ┌─────────────┐
//! │   Pricing   │────────────▶│ PayMongo Hosted  │───────────▶│  /payment/  │
//! │    page     │             │   Checkout Page  │            │   success   │
//! └─────────────┘             └────────┬─────────┘            └─────────────┘
//!                                      │ webhook (signed)
//!                                      ▼
//!                          ┌────────────────────────┐
//!                          │ WebhookHandler         │
//!                          │  verify → map → relay  │──▶ process_paymongo_webhook
//!                          └────────────────────────┘
//! ```
//!
//! Checkout sessions and payment links are created through [`PayMongoClient`].
//! The browser return is cosmetic; the subscription only activates once the
//! signed webhook relays `succeeded` to the database.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mailroom_payments::{CheckoutRequest, LineItem, PayMongoClient};
//!
//! let client = PayMongoClient::from_env()?;
//! let session = client
//!     .create_checkout_session(&CheckoutRequest::single(
//!         LineItem::new("Mailroom Basic (monthly)", 49_900),
//!         "https://mail.example.com/payment/success",
//!         "https://mail.example.com/pricing",
//!     ))
//!     .await?;
//!
//! // Redirect user to: session.checkout_url
//! ```

mod checkout;
mod error;
mod link;
mod signature;
mod webhook;

pub use checkout::{
    CURRENCY, CheckoutRequest, CheckoutSession, LineItem, PAYMONGO_API_BASE, PayMongoClient,
    default_payment_methods,
};
pub use error::{PaymentError, Result};
pub use link::{LinkRequest, MIN_LINK_AMOUNT, PaymentLink};
pub use signature::{SIGNATURE_HEADER, SignatureHeader, compute_signature, verify_signature};
pub use webhook::{PayMongoEvent, PaymentStatus, WebhookHandler, WebhookOutcome};
