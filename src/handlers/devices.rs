use axum::body::{Body, Bytes};
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, NotFoundError, ValidationError};
use crate::router::AppState;
use crate::shared::{
    validate_device_id, validate_device_patch, validate_new_device, validate_status_update,
};

/// Handler for POST /api/devices
pub async fn create_device(
    state: &AppState,
    request_id: &str,
    body: &Bytes,
) -> Result<Response, ApiError> {
    info!(request_id = %request_id, "Processing create device request");

    let payload = parse_body(request_id, body)?;
    let new_device = validate_new_device(&payload).map_err(|errors| {
        warn!(request_id = %request_id, errors = %errors, "Device payload rejected");
        errors
    })?;

    let device = state.devices.create_device(&new_device).await?;

    info!(
        request_id = %request_id,
        device_id = %device.id,
        device_type = %device.device_type(),
        "Device created"
    );

    json_response(StatusCode::CREATED, &device, request_id)
}

/// Handler for GET /api/devices
pub async fn list_devices(state: &AppState, request_id: &str) -> Result<Response, ApiError> {
    let devices = state.devices.get_all_devices().await?;

    info!(request_id = %request_id, count = devices.len(), "Listed devices");

    json_response(StatusCode::OK, &devices, request_id)
}

/// Handler for GET /api/devices/{id}
pub async fn get_device(
    state: &AppState,
    request_id: &str,
    device_id: &str,
) -> Result<Response, ApiError> {
    let id = parse_device_id(request_id, device_id)?;

    let device = state
        .devices
        .get_device_by_id(id)
        .await?
        .ok_or(NotFoundError::DeviceNotFound)?;

    info!(request_id = %request_id, device_id = %id, "Device retrieved");

    json_response(StatusCode::OK, &device, request_id)
}

/// Handler for PUT /api/devices/{id}
///
/// Fields absent from the body keep their stored values. The device type
/// itself can never change.
pub async fn update_device(
    state: &AppState,
    request_id: &str,
    device_id: &str,
    body: &Bytes,
) -> Result<Response, ApiError> {
    let id = parse_device_id(request_id, device_id)?;
    let payload = parse_body(request_id, body)?;
    let patch = validate_device_patch(&payload)?;

    let device = state.devices.update_device(id, &patch).await?;

    info!(
        request_id = %request_id,
        device_id = %id,
        empty_patch = patch.is_empty(),
        "Device updated"
    );

    json_response(StatusCode::OK, &device, request_id)
}

/// Handler for PUT /api/devices/{id}/update-status
pub async fn update_device_status(
    state: &AppState,
    request_id: &str,
    device_id: &str,
    body: &Bytes,
) -> Result<Response, ApiError> {
    let id = parse_device_id(request_id, device_id)?;
    let payload = parse_body(request_id, body)?;
    let status = validate_status_update(&payload)?;

    let device = state.devices.update_device_status(id, status).await?;

    info!(
        request_id = %request_id,
        device_id = %id,
        device_status = %status,
        "Device status updated"
    );

    json_response(StatusCode::OK, &device, request_id)
}

/// Handler for DELETE /api/devices/{id}
pub async fn delete_device(
    state: &AppState,
    request_id: &str,
    device_id: &str,
) -> Result<Response, ApiError> {
    let id = parse_device_id(request_id, device_id)?;

    state.devices.delete_device(id).await?;

    info!(request_id = %request_id, device_id = %id, "Device deleted");

    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .body(Body::empty())
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

fn parse_device_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    validate_device_id(raw).map_err(|e| {
        warn!(request_id = %request_id, device_id = %raw, "Malformed device id");
        ApiError::Validation(ValidationError::InvalidId(e.message))
    })
}

fn parse_body(request_id: &str, body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Failed to parse request body");
        ApiError::Validation(ValidationError::InvalidBody(format!("Invalid JSON: {}", e)))
    })
}

pub(crate) fn json_response<T: Serialize>(
    status: StatusCode,
    payload: &T,
    request_id: &str,
) -> Result<Response, ApiError> {
    let response_body = serde_json::to_string(payload).map_err(|e| {
        error!(request_id = %request_id, error = %e, "Failed to serialize response");
        ApiError::Internal(format!("Failed to serialize response: {}", e))
    })?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(response_body))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::to_bytes;
    use axum::http::HeaderValue;
    use serde_json::json;

    use crate::repo::MemoryDeviceRepository;
    use crate::shared::FixedIdGenerator;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn state() -> AppState {
        let ids = Arc::new(FixedIdGenerator::from_strings(&[ID]));
        AppState::new(
            Arc::new(MemoryDeviceRepository::new(ids)),
            HeaderValue::from_static("*"),
        )
    }

    fn body(value: Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    async fn json_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn temperature_sensor() -> Value {
        json!({
            "deviceName": "T1",
            "macAddress": "aa-bb-cc-dd-ee-02",
            "deviceStatus": "inactive",
            "deviceType": "TemperatureSensor",
            "tempC": 21.5
        })
    }

    #[tokio::test]
    async fn test_create_returns_201_with_id() {
        let state = state();
        let response = create_device(&state, "req-1", &body(temperature_sensor()))
            .await
            .unwrap();

        assert_eq!(response.status(), 201);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );

        let created = json_of(response).await;
        assert_eq!(created["id"], ID);
        assert_eq!(created["tempC"], 21.5);
        assert!(created.get("moistureLevel").is_none());
        assert!(created.get("location").is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let state = state();
        let result = create_device(&state, "req-1", &Bytes::from_static(b"{not json")).await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidBody(_)))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload_without_storing() {
        let state = state();
        let mut payload = temperature_sensor();
        payload["batteryLevel"] = json!(150);

        let result = create_device(&state, "req-1", &body(payload)).await;
        match result {
            Err(ApiError::Validation(ValidationError::Fields(errors))) => {
                assert!(errors.has_field("batteryLevel"));
            }
            other => panic!("Expected field errors, got {:?}", other.map(|r| r.status())),
        }

        assert!(state.devices.get_all_devices().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_with_malformed_id() {
        let state = state();
        let result = get_device(&state, "req-1", "not-a-uuid").await;

        assert!(matches!(
            result,
            Err(ApiError::Validation(ValidationError::InvalidId(_)))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_device() {
        let state = state();
        let result = get_device(&state, "req-1", ID).await;

        assert!(matches!(
            result,
            Err(ApiError::NotFound(NotFoundError::DeviceNotFound))
        ));
    }

    #[tokio::test]
    async fn test_status_update_and_delete() {
        let state = state();
        create_device(&state, "req-1", &body(temperature_sensor()))
            .await
            .unwrap();

        let response = update_device_status(
            &state,
            "req-2",
            ID,
            &body(json!({"deviceStatus": "maintenance"})),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(json_of(response).await["deviceStatus"], "maintenance");

        let response = delete_device(&state, "req-3", ID).await.unwrap();
        assert_eq!(response.status(), 204);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());

        let result = delete_device(&state, "req-4", ID).await;
        assert!(matches!(
            result,
            Err(ApiError::Database(crate::error::DatabaseError::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_update_with_empty_body_object_returns_stored() {
        let state = state();
        create_device(&state, "req-1", &body(temperature_sensor()))
            .await
            .unwrap();

        let response = update_device(&state, "req-2", ID, &body(json!({})))
            .await
            .unwrap();
        let device = json_of(response).await;

        assert_eq!(device["deviceName"], "T1");
        assert_eq!(device["deviceStatus"], "inactive");
    }
}
