//! Print pipeline handler.

use axum::extract::Extension;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::Form;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::print_request::PrintRequestBuilder;
use crate::proxy;
use crate::state::AppState;

use super::common::{caller_identity, error_response};

/// POST /print - Build and forward a land register print request.
///
/// The body is raw urlencoded pairs; any parameter is accepted and carried
/// through normalization, not just the documented ones.
pub async fn print_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Form(params): Form<Vec<(String, String)>>,
) -> Response {
    metrics::counter!("landreg_print_requests_total").increment(1);

    if let Some(user) = caller_identity(&headers) {
        info!(user = %user, "Print requested");
    }
    info!(params = ?params, "POST params");

    let builder = PrintRequestBuilder::new(
        &state.config.print_layers,
        state.parcel_lookup.as_ref(),
    );

    let request = match builder.build(params).await {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Print request rejected");
            metrics::counter!("landreg_print_failures_total").increment(1);
            return error_response(&e);
        }
    };

    // The parcel lookup is done and its connection returned before the
    // engine call starts; streaming holds no database resources.
    let url = state.config.project_url();
    info!(url = %url, "Forwarding print request");

    match proxy::forward_print(&state.http, &url, &state.config.project, &request).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Print forwarding failed");
            metrics::counter!("landreg_print_failures_total").increment(1);
            error_response(&e)
        }
    }
}
