//! Completion error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a completion round-trip
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Request was cancelled before it finished")]
    Cancelled,
}

impl CompletionError {
    /// Check if this error came from the transport rather than the service
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            CompletionError::Network(_) | CompletionError::Timeout(_) | CompletionError::Cancelled
        )
    }

    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            CompletionError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_connection() {
        assert!(CompletionError::Timeout(Duration::from_secs(1)).is_connection());
        assert!(CompletionError::Cancelled.is_connection());
        assert!(!CompletionError::MalformedResponse("x".to_string()).is_connection());
        assert!(
            !CompletionError::Api {
                status: 500,
                message: String::new()
            }
            .is_connection()
        );
    }

    #[test]
    fn test_status() {
        let err = CompletionError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.to_string(), "API error 401: unauthorized");
        assert_eq!(CompletionError::Cancelled.status(), None);
    }
}
