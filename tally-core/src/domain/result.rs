//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// The first four variants are the failure classes of the request
/// lifecycle. Everything below them is local plumbing (storage, config,
/// serialization).
#[derive(Error, Debug)]
pub enum Error {
    /// Client-side input check failed; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The backend answered 401. The session has already been torn down.
    #[error("Authentication required")]
    Authentication,

    /// The backend answered with a non-success status.
    #[error("Request rejected (HTTP {status}){}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// No usable response (connection failure, timeout, unreadable body).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether this error already triggered the global session teardown
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }

    /// Message to show inline for this error.
    ///
    /// Backend rejections surface the backend's own message verbatim;
    /// validation errors surface their own text; everything else falls
    /// back to the caller's generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context, returned to presentation code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }

    /// Convert a core result, using `fallback` when the error carries no
    /// user-facing message of its own
    pub fn from_result(result: Result<T>, fallback: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                if let Error::Rejected { status, .. } = &e {
                    context.insert("status".to_string(), serde_json::json!(status));
                }
                if context.is_empty() {
                    Self::fail(e.user_message(fallback))
                } else {
                    Self::fail_with_context(e.user_message(fallback), context)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_operation_result_fail() {
        let result: OperationResult<i32> = OperationResult::fail("Something went wrong");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_backend_message_wins_over_fallback() {
        let err = Error::Rejected {
            status: 409,
            message: Some("User with email or username already exists".to_string()),
        };
        assert_eq!(
            err.user_message("Registration failed"),
            "User with email or username already exists"
        );
    }

    #[test]
    fn test_blank_backend_message_uses_fallback() {
        let err = Error::Rejected {
            status: 500,
            message: Some("   ".to_string()),
        };
        assert_eq!(err.user_message("Login failed"), "Login failed");

        let err = Error::network("connection refused");
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_from_result_carries_status_context() {
        let err: Result<()> = Err(Error::Rejected {
            status: 400,
            message: None,
        });
        let result = OperationResult::from_result(err, "Login failed");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Login failed"));
        assert_eq!(
            result.context.unwrap().get("status"),
            Some(&serde_json::json!(400))
        );
    }

    #[test]
    fn test_rejected_display() {
        let err = Error::Rejected {
            status: 422,
            message: Some("Amount is required".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Request rejected (HTTP 422): Amount is required"
        );
    }
}
