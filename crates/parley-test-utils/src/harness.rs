// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a dispatcher over in-memory storage and mock
//! collaborators for one bot definition. `send()` and `click()` drive the
//! full dispatch pipeline for a single test contact.

use std::sync::Arc;
use std::time::Duration;

use parley_agent::{DispatchOutcome, Dispatcher};
use parley_config::{EngineConfig, MessagesConfig};
use parley_core::error::ParleyError;
use parley_core::session::Session;
use parley_core::settings::BotDefinition;
use parley_core::traits::SessionStore;
use parley_core::types::{ContactKey, InboundMessage};
use parley_core::Services;
use parley_flow::FlowRunner;
use parley_storage::{HandoffTracker, MemoryConversationLog, MemorySessionStore, StaticCatalog};

use crate::mocks::{MockAiResponder, MockFetcher, MockHandoff, MockSender, MockWebhook};
use crate::store::DelayedSessionStore;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    definition: BotDefinition,
    engine: EngineConfig,
    messages: MessagesConfig,
    ai: Option<Arc<MockAiResponder>>,
    lookup_delay: Option<Duration>,
    contact: ContactKey,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            definition: BotDefinition::default(),
            engine: EngineConfig::default(),
            messages: MessagesConfig::default(),
            ai: None,
            lookup_delay: None,
            contact: ContactKey::new("default", "+15550100", "mock"),
        }
    }

    pub fn with_definition(mut self, definition: BotDefinition) -> Self {
        self.definition = definition;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_messages(mut self, messages: MessagesConfig) -> Self {
        self.messages = messages;
        self
    }

    /// Wires an AI responder answering with `responses`, one per call.
    pub fn with_ai_responses<S: Into<String>>(mut self, responses: impl IntoIterator<Item = S>) -> Self {
        self.ai = Some(Arc::new(MockAiResponder::with_responses(responses)));
        self
    }

    /// Wires an AI responder with no scripted answers; every call fails.
    pub fn with_failing_ai(mut self) -> Self {
        self.ai = Some(Arc::new(MockAiResponder::new()));
        self
    }

    /// Delays every session lookup, see [`DelayedSessionStore`].
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub fn with_contact(mut self, contact: ContactKey) -> Self {
        self.contact = contact;
        self
    }

    pub fn build(self) -> TestHarness {
        let sender = Arc::new(MockSender::new());
        let fetcher = Arc::new(MockFetcher::new());
        let handoff = Arc::new(MockHandoff::new());
        let webhook = Arc::new(MockWebhook::new());
        let log = Arc::new(MemoryConversationLog::new());
        let store = Arc::new(MemorySessionStore::new());
        let sessions: Arc<dyn SessionStore> = match self.lookup_delay {
            Some(delay) => Arc::new(DelayedSessionStore::new(store.clone(), delay)),
            None => store.clone(),
        };
        let handoffs = Arc::new(HandoffTracker::new(Duration::from_secs(
            self.engine.handoff_tracking_ttl_secs,
        )));

        let services = Services {
            sender: sender.clone(),
            fetcher: fetcher.clone(),
            handoff: handoff.clone(),
            webhooks: webhook.clone(),
            log: log.clone(),
            sessions,
            catalog: Arc::new(StaticCatalog::new(self.definition)),
            ai: self
                .ai
                .clone()
                .map(|ai| ai as Arc<dyn parley_core::traits::AiResponder>),
        };
        let dispatcher = Arc::new(Dispatcher::new(
            services.clone(),
            handoffs.clone(),
            self.engine.clone(),
            self.messages.clone(),
        ));

        TestHarness {
            dispatcher,
            services,
            sender,
            fetcher,
            handoff,
            webhook,
            ai: self.ai,
            log,
            store,
            handoffs,
            engine: self.engine,
            messages: self.messages,
            contact: self.contact,
        }
    }
}

/// A dispatcher over mock collaborators, with handles to inspect them.
pub struct TestHarness {
    pub dispatcher: Arc<Dispatcher>,
    pub services: Services,
    pub sender: Arc<MockSender>,
    pub fetcher: Arc<MockFetcher>,
    pub handoff: Arc<MockHandoff>,
    pub webhook: Arc<MockWebhook>,
    pub ai: Option<Arc<MockAiResponder>>,
    pub log: Arc<MemoryConversationLog>,
    pub store: Arc<MemorySessionStore>,
    pub handoffs: Arc<HandoffTracker>,
    pub engine: EngineConfig,
    pub messages: MessagesConfig,
    pub contact: ContactKey,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness for `definition` with default settings.
    pub fn with_definition(definition: BotDefinition) -> Self {
        Self::builder().with_definition(definition).build()
    }

    /// A flow runner over the harness's collaborators.
    pub fn flow_runner(&self) -> FlowRunner {
        FlowRunner::new(
            self.services.clone(),
            self.handoffs.clone(),
            &self.engine,
            self.messages.clone(),
        )
    }

    /// A fresh session for the test contact, not yet stored.
    pub fn new_session(&self) -> Session {
        Session::new(self.contact.clone(), chrono::Utc::now())
    }

    /// Sends a text message from the test contact.
    pub async fn send(&self, text: &str) -> Result<DispatchOutcome, ParleyError> {
        self.dispatcher
            .dispatch(InboundMessage::text(self.contact.clone(), text))
            .await
    }

    /// Clicks a reply button as the test contact.
    pub async fn click(&self, id: &str, title: &str) -> Result<DispatchOutcome, ParleyError> {
        self.dispatcher
            .dispatch(InboundMessage::button_reply(self.contact.clone(), id, title))
            .await
    }

    /// The most recently created session of the test contact.
    pub async fn latest_session(&self) -> Option<Session> {
        self.store
            .list(&self.contact)
            .await
            .ok()
            .and_then(|mut sessions| sessions.pop())
    }

    /// Every session of the test contact, oldest first.
    pub async fn sessions(&self) -> Vec<Session> {
        self.store.list(&self.contact).await.unwrap_or_default()
    }
}
