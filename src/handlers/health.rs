use axum::http::StatusCode;
use axum::response::Response;
use serde::Serialize;

use super::devices::json_response;
use crate::error::ApiError;

pub const SERVICE_NAME: &str = "device-registry";

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub status: &'static str,
    pub service: &'static str,
    pub request_id: &'a str,
}

/// Handler for GET /health
pub fn health(request_id: &str) -> Result<Response, ApiError> {
    let body = HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        request_id,
    };
    json_response(StatusCode::OK, &body, request_id)
}
