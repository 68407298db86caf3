//! Common utilities shared across handlers.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;

use landreg_common::LandregError;

/// Render a gateway error as a JSON exception response.
pub fn error_response(err: &LandregError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({
        "code": err.exception_code(),
        "message": err.to_string(),
    });

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.to_string().into())
        .unwrap()
}

/// Optional caller identity forwarded by the auth layer in front of this
/// service. Never required.
pub fn caller_identity(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-identity").and_then(|v| v.to_str().ok())
}
