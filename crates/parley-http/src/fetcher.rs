// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ExternalFetcher` over HTTP.

use async_trait::async_trait;
use parley_config::HttpConfig;
use parley_core::data::SessionData;
use parley_core::error::ParleyError;
use parley_core::flow::ApiFetchConfig;
use parley_core::traits::ExternalFetcher;
use parley_core::types::ApiResponse;
use parley_template::Renderer;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::client::{build_client, has_content_type, with_headers};
use crate::extract::extract_response;

/// Performs `api_fetch` requests with reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
    renderer: Renderer,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig, max_loop_iterations: usize) -> Result<Self, ParleyError> {
        Ok(Self {
            client: build_client(config)?,
            renderer: Renderer::new(max_loop_iterations),
        })
    }
}

fn fetch_error(message: String, source: reqwest::Error) -> ParleyError {
    ParleyError::Fetch {
        message,
        source: Some(Box::new(source)),
    }
}

#[async_trait]
impl ExternalFetcher for HttpFetcher {
    async fn fetch(
        &self,
        config: &ApiFetchConfig,
        data: &SessionData,
        _message_template: &str,
    ) -> Result<ApiResponse, ParleyError> {
        let vars = data.as_map();
        let url = self.renderer.render(&config.url, vars);
        let method = Method::from_bytes(config.method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ParleyError::Config(format!("invalid HTTP method `{}`", config.method)))?;

        let mut request = with_headers(
            self.client.request(method.clone(), &url),
            &config.headers,
            &self.renderer,
            vars,
        );
        if let Some(template) = config.body.as_deref() {
            if !has_content_type(&config.headers) {
                request = request.header(CONTENT_TYPE, "application/json");
            }
            request = request.body(self.renderer.render(template, vars));
        }

        let response = request
            .send()
            .await
            .map_err(|e| fetch_error(format!("request to {url} failed: {e}"), e))?;
        let status = response.status();
        debug!(method = %method, url = %url, status = %status, "api fetch response");
        if !status.is_success() {
            return Err(ParleyError::fetch(format!("{url} returned {status}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| fetch_error(format!("failed to read response from {url}: {e}"), e))?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| ParleyError::Fetch {
                message: format!("response from {url} is not JSON: {e}"),
                source: Some(Box::new(e)),
            })?
        };
        Ok(extract_response(&body, config))
    }
}
