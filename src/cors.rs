use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::router::AppState;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, X-Request-Id";
const MAX_AGE_SECONDS: &str = "3600";

/// Parse the configured allowed origin, falling back to `*` if it is not a valid header value
pub fn parse_origin(origin: &str) -> HeaderValue {
    HeaderValue::from_str(origin).unwrap_or_else(|_| {
        warn!(origin = %origin, "Invalid CORS_ALLOWED_ORIGIN, using *");
        HeaderValue::from_static("*")
    })
}

/// Add CORS headers to a response
pub fn add_cors_headers(mut response: Response, allowed_origin: &HeaderValue) -> Response {
    let headers = response.headers_mut();

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin.clone());
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECONDS),
    );

    response
}

/// Create a preflight response for OPTIONS requests
///
/// Returns a 200 OK response with CORS headers and an empty body.
pub fn preflight_response(allowed_origin: &HeaderValue) -> Response {
    let response = (StatusCode::OK, Body::empty()).into_response();
    add_cors_headers(response, allowed_origin)
}

/// Middleware answering preflight requests and decorating every other response
pub async fn cors_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return preflight_response(&state.cors_origin);
    }

    let response = next.run(request).await;
    add_cors_headers(response, &state.cors_origin)
}
