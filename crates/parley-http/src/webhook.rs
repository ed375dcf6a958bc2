// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `WebhookDispatcher` over HTTP.

use async_trait::async_trait;
use parley_config::HttpConfig;
use parley_core::data::SessionData;
use parley_core::error::ParleyError;
use parley_core::flow::{Flow, OnComplete};
use parley_core::session::Session;
use parley_core::traits::WebhookDispatcher;
use parley_core::types::{ContactKey, SessionId};
use parley_template::Renderer;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{debug, info};

use crate::client::{build_client, has_content_type, with_headers};

/// Default body posted when the webhook sets no body template.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub flow_id: &'a str,
    pub flow_name: &'a str,
    pub session_id: &'a SessionId,
    pub contact: &'a ContactKey,
    pub data: &'a SessionData,
}

/// Posts flow completion webhooks with reqwest.
pub struct HttpWebhookDispatcher {
    client: reqwest::Client,
    renderer: Renderer,
}

impl HttpWebhookDispatcher {
    pub fn new(config: &HttpConfig, max_loop_iterations: usize) -> Result<Self, ParleyError> {
        Ok(Self {
            client: build_client(config)?,
            renderer: Renderer::new(max_loop_iterations),
        })
    }
}

#[async_trait]
impl WebhookDispatcher for HttpWebhookDispatcher {
    async fn dispatch(
        &self,
        flow: &Flow,
        session: &Session,
        contact: &ContactKey,
    ) -> Result<(), ParleyError> {
        let OnComplete::Webhook(action) = &flow.on_complete else {
            return Ok(());
        };
        let vars = session.data.as_map();
        let url = self.renderer.render(&action.url, vars);

        let body = match action.body.as_deref() {
            Some(template) => self.renderer.render(template, vars),
            None => serde_json::to_string(&WebhookPayload {
                flow_id: &flow.id,
                flow_name: &flow.name,
                session_id: &session.id,
                contact,
                data: &session.data,
            })
            .map_err(|e| ParleyError::Webhook {
                message: format!("failed to encode payload: {e}"),
                source: Some(Box::new(e)),
            })?,
        };

        let mut request = with_headers(self.client.post(&url), &action.headers, &self.renderer, vars);
        if !has_content_type(&action.headers) {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| ParleyError::Webhook {
                message: format!("request to {url} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(flow_id = %flow.id, url = %url, status = %status, "webhook response");
        if !status.is_success() {
            return Err(ParleyError::Webhook {
                message: format!("{url} returned {status}"),
                source: None,
            });
        }
        info!(flow_id = %flow.id, session_id = %session.id, "completion webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use parley_core::flow::WebhookAction;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn dispatcher() -> HttpWebhookDispatcher {
        HttpWebhookDispatcher::new(&HttpConfig::default(), 50).unwrap()
    }

    fn session() -> Session {
        let mut session = Session::new(
            ContactKey::new("acme", "+15550001", "whatsapp"),
            chrono::Utc::now(),
        );
        session.data.set("name", "Ada");
        session
    }

    fn flow_with(action: WebhookAction) -> Flow {
        let mut flow = Flow::new("signup", "Signup");
        flow.on_complete = OnComplete::Webhook(action);
        flow
    }

    #[tokio::test]
    async fn posts_default_payload() {
        let server = MockServer::start().await;
        let session = session();
        Mock::given(method("POST"))
            .and(path("/done"))
            .and(body_json(json!({
                "flow_id": "signup",
                "flow_name": "Signup",
                "session_id": session.id.0,
                "contact": {"tenant_id": "acme", "contact": "+15550001", "channel": "whatsapp"},
                "data": {"name": "Ada"}
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_with(WebhookAction {
            url: format!("{}/done", server.uri()),
            headers: BTreeMap::new(),
            body: None,
        });
        dispatcher()
            .dispatch(&flow, &session, &session.key)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn posts_rendered_body_with_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-signup", "Ada"))
            .and(header("content-type", "text/plain"))
            .and(body_string("New signup: Ada"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_with(WebhookAction {
            url: server.uri(),
            headers: BTreeMap::from([
                ("X-Signup".to_string(), "{{name}}".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
            ]),
            body: Some("New signup: {{name}}".into()),
        });
        let session = session();
        dispatcher()
            .dispatch(&flow, &session, &session.key)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failure_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_with(WebhookAction {
            url: server.uri(),
            headers: BTreeMap::new(),
            body: None,
        });
        let session = session();
        let err = dispatcher()
            .dispatch(&flow, &session, &session.key)
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::Webhook { .. }));
    }

    #[tokio::test]
    async fn flow_without_webhook_is_a_no_op() {
        let flow = Flow::new("plain", "Plain");
        let session = session();
        dispatcher()
            .dispatch(&flow, &session, &session.key)
            .await
            .unwrap();
    }
}
