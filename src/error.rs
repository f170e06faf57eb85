use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::shared::error::{error_codes, ErrorResponse};
use crate::shared::{DeviceType, FieldError, ValidationErrors};

/// Main error type for the device API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not found error: {0}")]
    NotFound(#[from] NotFoundError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validation-specific errors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid fields: {0}")]
    Fields(#[from] ValidationErrors),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid device id: {0}")]
    InvalidId(String),
}

/// Not found errors
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("Resource not found")]
    ResourceNotFound,
}

/// Storage-level errors raised by device repositories
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Device not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Device is a {stored}; deviceType cannot change")]
    DeviceTypeMismatch { stored: DeviceType },

    #[error("Stored row is invalid: {0}")]
    InvalidRow(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::ConstraintViolation(
                    db_err
                        .constraint()
                        .map(|c| format!("unique constraint {} violated", c))
                        .unwrap_or_else(|| db_err.message().to_string()),
                )
            }
            sqlx::Error::RowNotFound => DatabaseError::NotFound,
            _ => DatabaseError::Storage(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(ValidationError::Fields(errors))
    }
}

impl ApiError {
    /// Convert error to HTTP response with appropriate status code and error payload
    pub fn to_http_response(&self, request_id: &str) -> Response {
        let body = match self {
            // Validation errors
            ApiError::Validation(ValidationError::Fields(errors)) => {
                return respond(
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_fields(
                        error_codes::VALIDATION_FAILED,
                        errors.errors().to_vec(),
                        request_id,
                    ),
                );
            }
            ApiError::Validation(ValidationError::InvalidBody(msg)) => (
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_FORMAT,
                msg.clone(),
            ),
            ApiError::Validation(ValidationError::InvalidId(msg)) => {
                (StatusCode::BAD_REQUEST, error_codes::INVALID_ID, msg.clone())
            }

            // Not found errors
            ApiError::NotFound(NotFoundError::DeviceNotFound)
            | ApiError::Database(DatabaseError::NotFound) => (
                StatusCode::NOT_FOUND,
                error_codes::DEVICE_NOT_FOUND,
                String::from("Device not found"),
            ),
            ApiError::NotFound(NotFoundError::ResourceNotFound) => (
                StatusCode::NOT_FOUND,
                error_codes::NOT_FOUND,
                String::from("Resource not found"),
            ),

            // Database errors
            ApiError::Database(DatabaseError::DeviceTypeMismatch { stored }) => {
                return respond(
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_fields(
                        error_codes::VALIDATION_FAILED,
                        vec![FieldError::new(
                            "deviceType",
                            format!("Device is a {}; deviceType cannot change", stored),
                        )],
                        request_id,
                    ),
                );
            }
            ApiError::Database(DatabaseError::ConstraintViolation(_)) => (
                StatusCode::CONFLICT,
                error_codes::DUPLICATE_MAC_ADDRESS,
                String::from("A device with this MAC address already exists"),
            ),
            ApiError::Database(DatabaseError::InvalidRow(_))
            | ApiError::Database(DatabaseError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::DATABASE_ERROR,
                String::from("Internal database error occurred"),
            ),

            // Transport errors
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                error_codes::METHOD_NOT_ALLOWED,
                String::from("Method not allowed"),
            ),
            ApiError::PayloadTooLarge(_) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                error_codes::PAYLOAD_TOO_LARGE,
                String::from("Request body exceeds the size limit"),
            ),

            // Internal errors
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                String::from("Internal server error occurred"),
            ),
        };

        let (status, code, message) = body;
        respond(status, ErrorResponse::new(code, message, request_id))
    }

    /// Whether this error represents a server-side fault
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::Internal(_)
                | ApiError::Database(DatabaseError::InvalidRow(_))
                | ApiError::Database(DatabaseError::Storage(_))
        )
    }
}

fn respond(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}
