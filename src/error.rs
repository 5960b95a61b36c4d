//! Error types for Lineboard
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Lineboard
#[derive(Debug, Error)]
pub enum LineboardError {
    /// Missing or invalid backend configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Order not found in the backend
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Backend rejected a request
    #[error("Backend error {status}: {message}")]
    Api { status: u16, message: String },

    /// Network-level failure talking to the backend
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Bulk import input error
    #[error("Import error: {0}")]
    Import(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LineboardError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// 4xx-class backend rejections are never retried; 5xx and transport
    /// failures are.
    pub fn is_retryable(&self) -> bool {
        match self {
            LineboardError::Api { status, .. } => *status >= 500,
            LineboardError::Network(_) => true,
            _ => false,
        }
    }
}

/// Result type alias for Lineboard operations
pub type Result<T> = std::result::Result<T, LineboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = LineboardError::Config("missing SUPABASE_URL".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing SUPABASE_URL");
    }

    #[test]
    fn test_order_not_found_error() {
        let err = LineboardError::OrderNotFound("ord-42".to_string());
        assert_eq!(err.to_string(), "Order not found: ord-42");
    }

    #[test]
    fn test_api_error_display() {
        let err = LineboardError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error 503: service unavailable");
    }

    #[test]
    fn test_api_error_retryable_only_for_5xx() {
        let server = LineboardError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        let client = LineboardError::Api {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
    }

    #[test]
    fn test_not_found_not_retryable() {
        assert!(!LineboardError::OrderNotFound("x".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LineboardError = io_err.into();
        assert!(matches!(err, LineboardError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: LineboardError = json_err.into();
        assert!(matches!(err, LineboardError::Json(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(LineboardError::Config("test".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}
