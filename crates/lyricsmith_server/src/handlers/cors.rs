//! Cross-origin headers for browser clients.
//!
//! The allowed origin is the request's `Origin` when it is whitelisted and the
//! first whitelist entry otherwise, so responses always carry a concrete
//! origin.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Methods served on `path`, plus `OPTIONS`.
pub fn allowed_methods(path: &str) -> &'static str {
    if path.trim_end_matches('/') == "/api/songs" {
        "GET, POST, OPTIONS"
    } else {
        "DELETE, OPTIONS"
    }
}

/// Pick the `Access-Control-Allow-Origin` value for a request.
pub fn resolve_origin(
    request_origin: Option<&str>,
    allowed: &[String],
    allow_any: bool,
) -> Option<String> {
    match request_origin {
        Some(origin) if allow_any => Some(origin.to_string()),
        Some(origin) if allowed.iter().any(|entry| entry == origin) => Some(origin.to_string()),
        _ if allow_any => Some("*".to_string()),
        _ => allowed.first().cloned(),
    }
}

fn apply_headers(headers: &mut HeaderMap, origin: Option<String>, methods: &'static str) {
    if let Some(value) = origin.and_then(|origin| HeaderValue::from_str(&origin).ok()) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(methods),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}

/// Middleware adding CORS headers to every response.
pub async fn apply_cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let methods = allowed_methods(request.uri().path());

    let mut response = next.run(request).await;
    let resolved = resolve_origin(
        origin.as_deref(),
        &state.config.allowed_origins,
        state.allow_public_access,
    );
    apply_headers(response.headers_mut(), resolved, methods);
    response
}

/// Preflight handler: `200` with an empty body.
pub async fn preflight() -> impl IntoResponse {
    StatusCode::OK
}
