//! HTTP error mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use mailroom_core::MailroomError;
use mailroom_payments::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Handler error, rendered as `(status, {error, code})`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid signature")]
    InvalidSignature,

    /// A dependency answered badly or not at all
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Feature needs configuration this process does not have
    #[error("{0} not configured")]
    Unavailable(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Unavailable(_) => "NOT_CONFIGURED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show the caller
    fn public_message(&self) -> String {
        match self {
            Self::Upstream(_) => "Something went wrong. Please try again.".into(),
            Self::Internal(_) => "An error occurred processing your request.".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: self.code().into(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<MailroomError> for ApiError {
    fn from(err: MailroomError) -> Self {
        match err {
            MailroomError::Unauthorized => Self::Unauthorized,
            MailroomError::Forbidden(what) => Self::Forbidden(what),
            MailroomError::NotFound(what) => Self::NotFound(what),
            MailroomError::InvalidInput(msg) => Self::BadRequest(msg),
            MailroomError::RpcStatus { status: 401, .. } => Self::Unauthorized,
            MailroomError::RpcStatus { status: 403, message, .. } => Self::Forbidden(message),
            MailroomError::RpcStatus { status: 404, function, .. } => Self::NotFound(function),
            MailroomError::RpcStatus { status, message, .. } if (400..500).contains(&status) => {
                Self::BadRequest(message)
            }
            e @ (MailroomError::Rpc { .. }
            | MailroomError::RpcStatus { .. }
            | MailroomError::Http(_)
            | MailroomError::Feed(_)) => Self::Upstream(e.to_string()),
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::WebhookSignature(_) => Self::InvalidSignature,
            PaymentError::WebhookParse(msg) => Self::BadRequest(msg),
            PaymentError::Api { status, detail } if (400..500).contains(&status) => {
                Self::BadRequest(detail)
            }
            PaymentError::Config(_) => Self::Unavailable("Payments"),
            PaymentError::Relay(e) => Self::Internal(e.to_string()),
            e => Self::Upstream(e.to_string()),
        }
    }
}
