// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock collaborators that record every call for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use parley_core::data::SessionData;
use parley_core::error::ParleyError;
use parley_core::flow::{ApiFetchConfig, Flow};
use parley_core::session::Session;
use parley_core::settings::AiSettings;
use parley_core::traits::{
    AiResponder, ExternalFetcher, HandoffService, MessageSender, WebhookDispatcher,
};
use parley_core::types::{ApiResponse, Button, ChatTurn, ContactKey, HandoffRequest, MessageId};

/// A message captured by [`MockSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        contact: ContactKey,
        text: String,
    },
    Buttons {
        contact: ContactKey,
        body: String,
        buttons: Vec<Button>,
    },
    CtaUrl {
        contact: ContactKey,
        body: String,
        button_title: String,
        url: String,
    },
}

impl SentMessage {
    /// The visible text of the message.
    pub fn body(&self) -> &str {
        match self {
            SentMessage::Text { text, .. } => text,
            SentMessage::Buttons { body, .. } | SentMessage::CtaUrl { body, .. } => body,
        }
    }

    /// Reply buttons attached to the message.
    pub fn buttons(&self) -> &[Button] {
        match self {
            SentMessage::Buttons { buttons, .. } => buttons,
            _ => &[],
        }
    }
}

/// A mock messaging channel capturing outbound messages.
pub struct MockSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    failing: AtomicBool,
}

impl MockSender {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every following send fail with a channel error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all messages that were sent.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Bodies of all sent messages, in order.
    pub async fn sent_bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|m| m.body().to_string())
            .collect()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn last_sent(&self) -> Option<SentMessage> {
        self.sent.lock().await.last().cloned()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    async fn record(&self, msg: SentMessage) -> Result<MessageId, ParleyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ParleyError::channel("mock channel is down"));
        }
        self.sent.lock().await.push(msg);
        Ok(MessageId(format!("mock-msg-{}", uuid::Uuid::new_v4())))
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send_text(&self, contact: &ContactKey, text: &str) -> Result<MessageId, ParleyError> {
        self.record(SentMessage::Text {
            contact: contact.clone(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_buttons(
        &self,
        contact: &ContactKey,
        body: &str,
        buttons: &[Button],
    ) -> Result<MessageId, ParleyError> {
        self.record(SentMessage::Buttons {
            contact: contact.clone(),
            body: body.to_string(),
            buttons: buttons.to_vec(),
        })
        .await
    }

    async fn send_cta_url(
        &self,
        contact: &ContactKey,
        body: &str,
        button_title: &str,
        url: &str,
    ) -> Result<MessageId, ParleyError> {
        self.record(SentMessage::CtaUrl {
            contact: contact.clone(),
            body: body.to_string(),
            button_title: button_title.to_string(),
            url: url.to_string(),
        })
        .await
    }
}

/// A fetcher returning scripted responses in order.
///
/// With the queue empty it returns an empty [`ApiResponse`].
pub struct MockFetcher {
    responses: Mutex<VecDeque<Result<ApiResponse, String>>>,
    requests: Mutex<Vec<(ApiFetchConfig, SessionData)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_response(&self, response: ApiResponse) {
        self.responses.lock().await.push_back(Ok(response));
    }

    pub async fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// Configs and session data of every fetch, in order.
    pub async fn requests(&self) -> Vec<(ApiFetchConfig, SessionData)> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExternalFetcher for MockFetcher {
    async fn fetch(
        &self,
        config: &ApiFetchConfig,
        data: &SessionData,
        _message_template: &str,
    ) -> Result<ApiResponse, ParleyError> {
        self.requests
            .lock()
            .await
            .push((config.clone(), data.clone()));
        match self.responses.lock().await.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(ParleyError::fetch(message)),
            None => Ok(ApiResponse::default()),
        }
    }
}

/// An AI responder returning scripted answers in order.
pub struct MockAiResponder {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(Vec<ChatTurn>, String)>>,
}

impl MockAiResponder {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A responder that answers with `responses`, one per call.
    pub fn with_responses<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn push_error(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// History and user message of every call, in order.
    pub async fn calls(&self) -> Vec<(Vec<ChatTurn>, String)> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockAiResponder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiResponder for MockAiResponder {
    async fn generate(
        &self,
        _settings: &AiSettings,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, ParleyError> {
        self.calls
            .lock()
            .await
            .push((history.to_vec(), user_message.to_string()));
        match self.responses.lock().await.pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(message)) => Err(ParleyError::provider(message)),
            None => Err(ParleyError::provider("no scripted response")),
        }
    }
}

/// A handoff service recording every request.
pub struct MockHandoff {
    requests: Mutex<Vec<HandoffRequest>>,
    failing: AtomicBool,
}

impl MockHandoff {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn requests(&self) -> Vec<HandoffRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockHandoff {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HandoffService for MockHandoff {
    async fn create_handoff(&self, request: HandoffRequest) -> Result<(), ParleyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ParleyError::Handoff("mock handoff unavailable".into()));
        }
        self.requests.lock().await.push(request);
        Ok(())
    }
}

/// A webhook dispatcher recording `(flow id, session)` per call.
///
/// Completion webhooks are fired on a background task; use
/// [`MockWebhook::wait_for_calls`] before asserting.
pub struct MockWebhook {
    calls: Mutex<Vec<(String, Session)>>,
    notify: Notify,
}

impl MockWebhook {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    pub async fn calls(&self) -> Vec<(String, Session)> {
        self.calls.lock().await.clone()
    }

    /// Waits until at least `count` webhooks fired or `timeout` elapses.
    /// Returns the number of calls seen.
    pub async fn wait_for_calls(&self, count: usize, timeout: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            let seen = self.calls.lock().await.len();
            if seen >= count {
                return seen;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.calls.lock().await.len();
            }
        }
    }
}

impl Default for MockWebhook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookDispatcher for MockWebhook {
    async fn dispatch(
        &self,
        flow: &Flow,
        session: &Session,
        _contact: &ContactKey,
    ) -> Result<(), ParleyError> {
        self.calls
            .lock()
            .await
            .push((flow.id.clone(), session.clone()));
        self.notify.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ContactKey {
        ContactKey::new("t", "c", "mock")
    }

    #[tokio::test]
    async fn sender_captures_messages() {
        let sender = MockSender::new();
        sender.send_text(&key(), "hello").await.unwrap();
        sender
            .send_buttons(&key(), "pick", &[Button::reply("a", "A")])
            .await
            .unwrap();
        assert_eq!(sender.sent_count().await, 2);
        assert_eq!(sender.sent_bodies().await, vec!["hello", "pick"]);
        assert_eq!(sender.last_sent().await.unwrap().buttons().len(), 1);
    }

    #[tokio::test]
    async fn failing_sender_records_nothing() {
        let sender = MockSender::new();
        sender.set_failing(true);
        assert!(sender.send_text(&key(), "hello").await.is_err());
        assert_eq!(sender.sent_count().await, 0);
    }

    #[tokio::test]
    async fn fetcher_replays_in_order() {
        let fetcher = MockFetcher::new();
        fetcher
            .push_response(ApiResponse {
                message: Some("first".into()),
                ..ApiResponse::default()
            })
            .await;
        fetcher.push_error("boom").await;
        let config = ApiFetchConfig::get("https://api.example.com");
        let data = SessionData::new();
        let first = fetcher.fetch(&config, &data, "").await.unwrap();
        assert_eq!(first.message.as_deref(), Some("first"));
        assert!(fetcher.fetch(&config, &data, "").await.is_err());
        assert_eq!(fetcher.fetch(&config, &data, "").await.unwrap(), ApiResponse::default());
        assert_eq!(fetcher.requests().await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn webhook_wait_times_out() {
        let webhook = MockWebhook::new();
        assert_eq!(webhook.wait_for_calls(1, Duration::from_secs(1)).await, 0);
    }
}
