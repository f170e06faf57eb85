use serde::{Deserialize, Serialize};

use super::validators::FieldError;

/// Payload carried under the `error` key: an opaque message, or the full
/// list of field violations for validation failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

/// Standard error response payload
/// Contains the error detail, a stable machine-readable code, and the request ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message or list of field errors
    pub error: ErrorDetail,

    /// Stable machine-readable error code (e.g., "VALIDATION_FAILED")
    pub code: String,

    /// Request ID for tracing and debugging
    pub request_id: String,
}

impl ErrorResponse {
    /// Create a new error response with a plain message
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail::Message(message.into()),
            code: code.into(),
            request_id: request_id.into(),
        }
    }

    /// Create a validation error response listing every violated field
    pub fn with_fields(
        code: impl Into<String>,
        fields: Vec<FieldError>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorDetail::Fields(fields),
            code: code.into(),
            request_id: request_id.into(),
        }
    }
}

/// Common error codes used across the API
pub mod error_codes {
    // Validation errors
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const INVALID_ID: &str = "INVALID_ID";

    // Not found errors
    pub const DEVICE_NOT_FOUND: &str = "DEVICE_NOT_FOUND";
    pub const NOT_FOUND: &str = "NOT_FOUND";

    // Transport errors
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";

    // Conflict errors
    pub const DUPLICATE_MAC_ADDRESS: &str = "DUPLICATE_MAC_ADDRESS";

    // Database errors
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";

    // Internal errors
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_creation() {
        let error = ErrorResponse::new("DEVICE_NOT_FOUND", "Device not found", "req-123");

        assert_eq!(error.code, "DEVICE_NOT_FOUND");
        assert_eq!(
            error.error,
            ErrorDetail::Message(String::from("Device not found"))
        );
        assert_eq!(error.request_id, "req-123");
    }

    #[test]
    fn test_message_serializes_as_string() {
        let error = ErrorResponse::new("INTERNAL_ERROR", "Internal server error occurred", "r1");
        let value: serde_json::Value = serde_json::to_value(&error).unwrap();

        assert_eq!(value["error"], "Internal server error occurred");
        assert_eq!(value["code"], "INTERNAL_ERROR");
        assert_eq!(value["request_id"], "r1");
    }

    #[test]
    fn test_fields_serialize_as_array() {
        let error = ErrorResponse::with_fields(
            error_codes::VALIDATION_FAILED,
            vec![FieldError::new("tempC", "Required")],
            "req-456",
        );

        let json = serde_json::to_string(&error).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"][0]["field"], "tempC");
        assert_eq!(value["error"][0]["message"], "Required");

        let deserialized: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.error, error.error);
        assert_eq!(deserialized.code, error.code);
    }

    #[test]
    fn test_error_codes_constants() {
        assert_eq!(error_codes::VALIDATION_FAILED, "VALIDATION_FAILED");
        assert_eq!(error_codes::DUPLICATE_MAC_ADDRESS, "DUPLICATE_MAC_ADDRESS");
        assert_eq!(error_codes::DEVICE_NOT_FOUND, "DEVICE_NOT_FOUND");
    }
}
