//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Transport error talking to PayMongo
    #[error("PayMongo error: {0}")]
    PayMongo(String),

    /// PayMongo rejected the request
    #[error("PayMongo returned {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Webhook payload parsing failed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Relaying the status to the database failed
    #[error("Webhook relay failed: {0}")]
    Relay(#[from] mailroom_core::MailroomError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        Self::PayMongo(err.to_string())
    }
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PayMongo(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Relay(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> &str {
        match self {
            Self::PayMongo(_) | Self::Api { .. } => "Payment processing failed. Please try again.",
            Self::WebhookSignature(_) => "Invalid signature.",
            Self::Config(_) => "Service configuration error.",
            _ => "An error occurred processing your request.",
        }
    }
}
