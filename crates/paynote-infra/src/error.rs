//! HTTP error response shape
//!
//! `IntoResponse` for `AppError` lives in the API crate; both types are foreign here.

use serde::Serialize;

/// Standard error body for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted() {
        let body = serde_json::to_value(ErrorResponse::new("Unauthorized")).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Unauthorized"}));

        let body = serde_json::to_value(
            ErrorResponse::new("Bad request")
                .with_type("BAD_REQUEST")
                .with_details("payload missing"),
        )
        .unwrap();
        assert_eq!(body["error_type"], "BAD_REQUEST");
        assert_eq!(body["details"], "payload missing");
    }
}
