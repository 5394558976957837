//! Error Types

use thiserror::Error;

/// Result type alias for mailroom operations
pub type Result<T> = std::result::Result<T, MailroomError>;

/// Mailroom error types
#[derive(Error, Debug)]
pub enum MailroomError {
    /// Remote procedure could not be reached
    #[error("RPC {function} failed: {message}")]
    Rpc { function: String, message: String },

    /// Remote procedure answered with a non-success status
    #[error("RPC {function} returned {status}: {message}")]
    RpcStatus {
        function: String,
        status: u16,
        message: String,
    },

    /// Remote procedure returned a shape we could not decode
    #[error("Could not decode {function} result: {message}")]
    Decode { function: String, message: String },

    /// No valid session
    #[error("Unauthorized")]
    Unauthorized,

    /// Session is valid but lacks the required role
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Requested record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Caller supplied an invalid value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Realtime change feed error
    #[error("Change feed error: {0}")]
    Feed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl MailroomError {
    /// Build an RPC transport error
    pub fn rpc(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rpc {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Rpc { .. } | Self::Http(_) | Self::Feed(_) => true,
            Self::RpcStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Please sign in to continue.".into(),
            Self::Forbidden(_) => "You do not have access to this page.".into(),
            Self::NotFound(what) => format!("{what} could not be found."),
            Self::InvalidInput(msg) => msg.clone(),
            Self::RpcStatus { status, message, .. } if (400..500).contains(status) => {
                message.clone()
            }
            _ => "Something went wrong. Please try again.".into(),
        }
    }
}

impl From<anyhow::Error> for MailroomError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let server = MailroomError::RpcStatus {
            function: "get_user_full_details".into(),
            status: 503,
            message: "unavailable".into(),
        };
        let client = MailroomError::RpcStatus {
            function: "get_user_full_details".into(),
            status: 400,
            message: "bad input".into(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!MailroomError::Unauthorized.is_retryable());
    }

    #[test]
    fn test_client_errors_surface_database_message() {
        let err = MailroomError::RpcStatus {
            function: "request_mail_item_forward".into(),
            status: 400,
            message: "Item already forwarded".into(),
        };
        assert_eq!(err.user_message(), "Item already forwarded");
    }
}
