use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, put};
use axum::Router;
use tracing::{error, info, warn};

use crate::cors;
use crate::error::{ApiError, NotFoundError, ValidationError};
use crate::handlers;
use crate::repo::DeviceRepository;
use crate::request_id::RequestId;

/// State shared by every request
#[derive(Clone)]
pub struct AppState {
    pub devices: Arc<dyn DeviceRepository>,
    pub cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(devices: Arc<dyn DeviceRepository>, cors_origin: HeaderValue) -> Self {
        Self {
            devices,
            cors_origin,
        }
    }
}

/// Build the device API router
///
/// Every response, including errors, unknown routes and unsupported methods,
/// passes through the CORS middleware. OPTIONS requests are answered there
/// without routing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_route))
        .route("/api/devices", get(list_devices_route).post(create_device_route))
        .route("/api/devices/", get(list_devices_route).post(create_device_route))
        .route(
            "/api/devices/{id}",
            get(get_device_route)
                .put(update_device_route)
                .delete(delete_device_route),
        )
        .route("/api/devices/{id}/update-status", put(update_status_route))
        .fallback(not_found_route)
        .method_not_allowed_fallback(method_not_allowed_route)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cors::cors_middleware,
        ))
        .with_state(state)
}

/// Turn a handler result into a response, logging failures by severity
fn respond(request_id: &RequestId, result: Result<Response, ApiError>) -> Response {
    match result {
        Ok(response) => response,
        Err(e) => {
            if e.is_server_error() {
                error!(request_id = %request_id, error = %e, "Request failed");
            } else {
                warn!(request_id = %request_id, error = %e, "Request rejected");
            }
            e.to_http_response(request_id.as_str())
        }
    }
}

/// Path id as sent; a segment that is not valid UTF-8 is a malformed id
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    match path {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => Err(ApiError::Validation(ValidationError::InvalidId(
            rejection.body_text(),
        ))),
    }
}

fn request_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, ApiError> {
    match body {
        Ok(bytes) => Ok(bytes),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ApiError::PayloadTooLarge(rejection.body_text()))
        }
        Err(rejection) => Err(ApiError::Validation(ValidationError::InvalidBody(
            rejection.body_text(),
        ))),
    }
}

async fn health_route(request_id: RequestId) -> Response {
    info!(request_id = %request_id, "Health check endpoint");
    respond(&request_id, handlers::health::health(request_id.as_str()))
}

async fn list_devices_route(State(state): State<AppState>, request_id: RequestId) -> Response {
    info!(request_id = %request_id, "List devices endpoint");
    let result = handlers::devices::list_devices(&state, request_id.as_str()).await;
    respond(&request_id, result)
}

async fn create_device_route(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    info!(request_id = %request_id, "Create device endpoint");
    let result = match request_body(body) {
        Ok(body) => handlers::devices::create_device(&state, request_id.as_str(), &body).await,
        Err(e) => Err(e),
    };
    respond(&request_id, result)
}

async fn get_device_route(
    State(state): State<AppState>,
    request_id: RequestId,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id(path) {
        Ok(id) => {
            info!(request_id = %request_id, device_id = %id, "Get device endpoint");
            handlers::devices::get_device(&state, request_id.as_str(), &id).await
        }
        Err(e) => Err(e),
    };
    respond(&request_id, result)
}

async fn update_device_route(
    State(state): State<AppState>,
    request_id: RequestId,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match (path_id(path), request_body(body)) {
        (Ok(id), Ok(body)) => {
            info!(request_id = %request_id, device_id = %id, "Update device endpoint");
            handlers::devices::update_device(&state, request_id.as_str(), &id, &body).await
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    respond(&request_id, result)
}

async fn update_status_route(
    State(state): State<AppState>,
    request_id: RequestId,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match (path_id(path), request_body(body)) {
        (Ok(id), Ok(body)) => {
            info!(request_id = %request_id, device_id = %id, "Update device status endpoint");
            handlers::devices::update_device_status(&state, request_id.as_str(), &id, &body)
                .await
        }
        (Err(e), _) | (_, Err(e)) => Err(e),
    };
    respond(&request_id, result)
}

async fn delete_device_route(
    State(state): State<AppState>,
    request_id: RequestId,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let result = match path_id(path) {
        Ok(id) => {
            info!(request_id = %request_id, device_id = %id, "Delete device endpoint");
            handlers::devices::delete_device(&state, request_id.as_str(), &id).await
        }
        Err(e) => Err(e),
    };
    respond(&request_id, result)
}

async fn not_found_route(request_id: RequestId, method: Method, uri: Uri) -> Response {
    warn!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Unknown route"
    );
    ApiError::NotFound(NotFoundError::ResourceNotFound).to_http_response(request_id.as_str())
}

async fn method_not_allowed_route(request_id: RequestId, method: Method, uri: Uri) -> Response {
    warn!(
        request_id = %request_id,
        method = %method,
        path = %uri.path(),
        "Method not allowed"
    );
    ApiError::MethodNotAllowed.to_http_response(request_id.as_str())
}
