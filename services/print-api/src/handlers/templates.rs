//! Print template listing handler.

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;
use crate::templates;

use super::common::{caller_identity, error_response};

/// GET /templates - List available land register templates.
pub async fn templates_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    metrics::counter!("landreg_templates_requests_total").increment(1);

    if let Some(user) = caller_identity(&headers) {
        info!(user = %user, "Template listing requested");
    }

    match templates::list_templates(&state.http, &state.config).await {
        Ok(templates) => Json(templates).into_response(),
        Err(e) => {
            error!(error = %e, "Template listing failed");
            error_response(&e)
        }
    }
}
