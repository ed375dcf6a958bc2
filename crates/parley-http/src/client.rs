// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP client construction.

use std::collections::BTreeMap;
use std::time::Duration;

use parley_config::HttpConfig;
use parley_core::error::ParleyError;
use parley_template::Renderer;
use reqwest::RequestBuilder;
use serde_json::{Map, Value};

/// Builds a client with the configured timeout and user agent.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, ParleyError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| ParleyError::Config(format!("failed to build HTTP client: {e}")))
}

/// Adds rendered header templates to a request.
pub(crate) fn with_headers(
    mut request: RequestBuilder,
    headers: &BTreeMap<String, String>,
    renderer: &Renderer,
    data: &Map<String, Value>,
) -> RequestBuilder {
    for (name, template) in headers {
        request = request.header(name.as_str(), renderer.render(template, data));
    }
    request
}

/// Whether the headers already set a content type, ignoring case.
pub(crate) fn has_content_type(headers: &BTreeMap<String, String>) -> bool {
    headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case("content-type"))
}
