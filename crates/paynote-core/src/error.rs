//! Error types module
//!
//! `AppError` is the error surfaced at the HTTP boundary. Pipeline failures never reach
//! it: they are reported back to the chat surface and the webhook still acknowledges.
//! Signature failures are answered by the verification middleware itself. What is left
//! is a request body that cannot be decoded.

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_INPUT")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(_) => "The request body could not be decoded".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_metadata() {
        let err = AppError::InvalidInput("missing field `payload`".into());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.client_message().contains("payload"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Invalid input: JSON parsing error"));
    }
}
