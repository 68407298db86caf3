//! Upstream print forwarding and streamed response relay.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use reqwest::Client;
use std::time::Duration;

use landreg_common::{LandregError, LandregResult};

use crate::print_request::PrintRequest;

/// Upstream render timeout. Print jobs are slow; the engine enforces the
/// same limit on its side.
const PRINT_TIMEOUT: Duration = Duration::from_secs(120);

/// Map a transport error to the gateway error surface.
pub(crate) fn upstream_error(err: reqwest::Error) -> LandregError {
    if err.is_timeout() {
        LandregError::UpstreamTimeout
    } else {
        LandregError::Upstream(err.to_string())
    }
}

/// Forward a finished print request to the engine and relay the response.
///
/// The upstream body is streamed through chunk by chunk, preserving status
/// code and content type; nothing is buffered. Dropping the returned
/// response (caller disconnect) drops the upstream read with it. PDF output
/// gets a download disposition named after the project.
pub async fn forward_print(
    http: &Client,
    url: &str,
    project: &str,
    req: &PrintRequest,
) -> LandregResult<Response> {
    let format = req.get("FORMAT").unwrap_or("PDF").to_lowercase();

    let upstream = http
        .post(url)
        .form(req.entries())
        .timeout(PRINT_TIMEOUT)
        .send()
        .await
        .map_err(upstream_error)?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| LandregError::Upstream(format!("Invalid upstream status: {}", e)))?;

    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, &content_type);

    if content_type == "application/pdf" {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}.{}", project, format),
        );
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| LandregError::InternalError(e.to_string()))
}
