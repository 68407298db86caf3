//! Template catalog discovery against the rendering engine.

use reqwest::Client;
use std::time::Duration;

use landreg_common::LandregResult;

use crate::capabilities::{parse_composer_templates, ComposerTemplate};
use crate::config::ServiceConfig;
use crate::proxy::upstream_error;

/// Timeout for the capabilities fetch. Project settings documents are small;
/// anything slower than this is an operational fault upstream.
const CAPABILITIES_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch the engine's project settings and list the printable layouts.
///
/// Transport failures propagate to the caller; a document the parser cannot
/// make sense of degrades to an empty list. Exactly the template whose name
/// equals the configured default layout is marked default, if any.
pub async fn list_templates(
    http: &Client,
    config: &ServiceConfig,
) -> LandregResult<Vec<ComposerTemplate>> {
    let url = config.project_url();

    let response = http
        .get(&url)
        .query(&[
            ("SERVICE", "WMS"),
            ("VERSION", "1.3.0"),
            ("REQUEST", "GetProjectSettings"),
        ])
        .timeout(CAPABILITIES_TIMEOUT)
        .send()
        .await
        .map_err(upstream_error)?;

    let body = response.text().await.map_err(upstream_error)?;

    let mut templates = parse_composer_templates(&body);
    for template in &mut templates {
        template.is_default = template.name == config.default_layout;
    }

    Ok(templates)
}
