// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message dispatch.
//!
//! For each message the dispatcher tries, in order: active human handoff,
//! disabled chatbot, business hours, transfer keyword rule, running flow,
//! flow trigger, greeting, text keyword rule, AI responder, fallback. The
//! first branch that handles the message ends dispatch.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use parley_config::{EngineConfig, MessagesConfig};
use parley_core::error::ParleyError;
use parley_core::rules::KeywordRule;
use parley_core::session::Session;
use parley_core::settings::ChatbotSettings;
use parley_core::types::{
    ContactKey, Direction, HandoffRequest, HandoffSource, InboundMessage, with_generated_ids,
};
use parley_core::Services;
use parley_flow::{FlowRunner, FlowState, Outbox};
use parley_router::{match_flow_trigger, match_rules};
use parley_storage::{HandoffRecord, HandoffTracker};
use strum::Display;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::lock::ContactLocks;
use crate::session::SessionManager;

/// Which branch handled an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DispatchOutcome {
    /// Nothing to act on (blank text and no button).
    Ignored,
    /// A human agent owns the conversation; the bot stayed silent.
    HumanHandling,
    /// The tenant's chatbot is off; the contact was handed to the general queue.
    ChatbotDisabled,
    /// Outside business hours; the out-of-hours message was sent.
    OutOfHours,
    /// A transfer keyword rule handed the contact to an agent.
    KeywordTransfer,
    /// The message answered a running flow.
    FlowResponse(FlowState),
    /// A trigger keyword started a flow.
    FlowStarted(FlowState),
    Greeting,
    KeywordReply,
    AiReply,
    Fallback,
    /// Nothing applied and there was nothing to send.
    NoReply,
}

/// Single entry point for inbound messages.
pub struct Dispatcher {
    services: Services,
    sessions: SessionManager,
    runner: FlowRunner,
    handoffs: Arc<HandoffTracker>,
    locks: Option<ContactLocks>,
    engine: EngineConfig,
    messages: MessagesConfig,
}

impl Dispatcher {
    pub fn new(
        services: Services,
        handoffs: Arc<HandoffTracker>,
        engine: EngineConfig,
        messages: MessagesConfig,
    ) -> Self {
        let runner = FlowRunner::new(
            services.clone(),
            handoffs.clone(),
            &engine,
            messages.clone(),
        );
        let locks = engine.serialize_per_contact.then(ContactLocks::new);
        Self {
            sessions: SessionManager::new(services.sessions.clone(), handoffs.clone()),
            services,
            runner,
            handoffs,
            locks,
            engine,
            messages,
        }
    }

    pub fn runner(&self) -> &FlowRunner {
        &self.runner
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Whether a human agent currently owns the contact's conversation.
    pub fn is_handed_off(&self, key: &ContactKey) -> bool {
        self.handoffs.contains(key)
    }

    /// Returns the contact to the bot. True if a handoff was active.
    pub fn release_handoff(&self, key: &ContactKey) -> bool {
        self.handoffs.remove(key).is_some()
    }

    /// Handles `msg` on a background task.
    pub fn spawn(self: &Arc<Self>, msg: InboundMessage) -> JoinHandle<Result<DispatchOutcome, ParleyError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let key = msg.key.clone();
            let result = this.dispatch(msg).await;
            if let Err(e) = &result {
                error!(contact = %key, error = %e, "dispatch failed");
            }
            result
        })
    }

    /// Handles one inbound message.
    ///
    /// Messages of the same contact are handled one at a time unless
    /// `engine.serialize_per_contact` is off.
    pub async fn dispatch(&self, msg: InboundMessage) -> Result<DispatchOutcome, ParleyError> {
        if !msg.has_content() {
            return Ok(DispatchOutcome::Ignored);
        }
        let _guard = match &self.locks {
            Some(locks) => Some(locks.lock(&msg.key).await),
            None => None,
        };
        let outcome = self.handle(&msg).await?;
        info!(
            tenant_id = %msg.key.tenant_id,
            contact = %msg.key.contact,
            outcome = %outcome,
            "message dispatched"
        );
        Ok(outcome)
    }

    async fn handle(&self, msg: &InboundMessage) -> Result<DispatchOutcome, ParleyError> {
        let key = &msg.key;

        if self.handoffs.contains(key) {
            debug!(contact = %key, "contact is with a human agent, skipping");
            return Ok(DispatchOutcome::HumanHandling);
        }

        let settings = self.services.catalog.settings(&key.tenant_id).await?;
        if !settings.enabled {
            self.hand_off(key, None, "Chatbot disabled".to_string(), HandoffSource::ChatbotDisabled)
                .await;
            return Ok(DispatchOutcome::ChatbotDisabled);
        }

        let now = Utc::now();
        if !settings.automation_allowed_at(now) {
            if let Some(hours) = &settings.business_hours
                && !hours.out_of_hours_message.trim().is_empty()
                && let Err(e) = self
                    .services
                    .sender
                    .send_text(key, &hours.out_of_hours_message)
                    .await
            {
                warn!(contact = %key, error = %e, "failed to send out-of-hours message");
            }
            return Ok(DispatchOutcome::OutOfHours);
        }

        let minutes = settings
            .session_timeout_minutes
            .unwrap_or(self.engine.session_timeout_minutes);
        let (mut session, is_new) = self
            .sessions
            .get_or_create(key, TimeDelta::minutes(i64::from(minutes)))
            .await?;
        if let Err(e) = self
            .services
            .log
            .log_step(
                &session.id,
                Direction::Inbound,
                &msg.text,
                session.current_step.as_deref(),
            )
            .await
        {
            warn!(session_id = %session.id, error = %e, "failed to log inbound message");
        }

        let outcome = self.route(&mut session, is_new, msg, &settings).await;
        self.sessions.save(&session).await?;
        outcome
    }

    async fn route(
        &self,
        session: &mut Session,
        is_new: bool,
        msg: &InboundMessage,
        settings: &ChatbotSettings,
    ) -> Result<DispatchOutcome, ParleyError> {
        let tenant = session.key.tenant_id.clone();
        let outbox = Outbox::new(&self.services, session);

        let rules = self.services.catalog.keyword_rules(&tenant).await?;
        let matched: Option<KeywordRule> = match_rules(&rules, &msg.text).cloned();

        if let Some(rule) = matched.as_ref().filter(|r| r.is_transfer()) {
            if let Some(hours) = &settings.business_hours
                && !hours.is_open_at(Utc::now())
            {
                outbox.text(&hours.out_of_hours_message, None).await;
                return Ok(DispatchOutcome::OutOfHours);
            }
            let text = [
                Some(rule.response.body.as_str()),
                settings.transfer_message.as_deref(),
            ]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .unwrap_or(&self.messages.transfer);
            outbox.text(&self.runner.render(text, session), None).await;
            session.exit_flow();
            self.hand_off(
                &session.key,
                rule.team_id.clone(),
                format!("Keyword rule matched: {}", msg.text.trim()),
                HandoffSource::KeywordRule,
            )
            .await;
            return Ok(DispatchOutcome::KeywordTransfer);
        }

        if let Some(flow_id) = session.current_flow_id.clone() {
            match self.services.catalog.flow(&tenant, &flow_id).await? {
                Some(flow) => {
                    let state = self.runner.process_response(session, &flow, msg).await;
                    return Ok(DispatchOutcome::FlowResponse(state));
                }
                None => {
                    warn!(session_id = %session.id, flow_id = %flow_id, "running flow no longer exists, exiting");
                    session.exit_flow();
                }
            }
        }

        let flows = self.services.catalog.flows(&tenant).await?;
        if let Some(flow) = match_flow_trigger(&flows, &msg.text) {
            let state = self.runner.start_flow(session, flow).await;
            return Ok(DispatchOutcome::FlowStarted(state));
        }

        if is_new && settings.has_greeting() {
            let body = self.runner.render(&settings.greeting, session);
            let buttons = with_generated_ids(&settings.greeting_buttons);
            self.runner
                .send_with_buttons(session, &body, &buttons, None)
                .await;
            return Ok(DispatchOutcome::Greeting);
        }

        if let Some(rule) = matched {
            let body = self.runner.render(&rule.response.body, session);
            let buttons = with_generated_ids(&rule.response.buttons);
            self.runner
                .send_with_buttons(session, &body, &buttons, None)
                .await;
            return Ok(DispatchOutcome::KeywordReply);
        }

        if settings.ai.enabled
            && let Some(ai) = self.services.ai.as_ref()
        {
            let limit = settings
                .ai
                .history_limit
                .unwrap_or(self.engine.ai_history_limit);
            let mut history = self
                .services
                .log
                .recent_history(&session.id, limit + 1)
                .await
                .unwrap_or_else(|e| {
                    warn!(session_id = %session.id, error = %e, "failed to load history");
                    Vec::new()
                });
            // The message being answered is passed separately.
            if history
                .last()
                .is_some_and(|t| t.direction == Direction::Inbound && t.text == msg.text)
            {
                history.pop();
            }
            if history.len() > limit {
                history.drain(..history.len() - limit);
            }
            match ai.generate(&settings.ai, &history, &msg.text).await {
                Ok(answer) if !answer.trim().is_empty() => {
                    outbox.text(&answer, None).await;
                    return Ok(DispatchOutcome::AiReply);
                }
                Ok(_) => warn!(session_id = %session.id, "ai responder returned an empty answer"),
                Err(e) => warn!(session_id = %session.id, error = %e, "ai responder failed"),
            }
            return Ok(self.send_fallback(&outbox, session, settings).await);
        }

        if !is_new {
            return Ok(self.send_fallback(&outbox, session, settings).await);
        }
        Ok(DispatchOutcome::NoReply)
    }

    async fn send_fallback(
        &self,
        outbox: &Outbox,
        session: &Session,
        settings: &ChatbotSettings,
    ) -> DispatchOutcome {
        if settings.fallback_message.trim().is_empty() {
            return DispatchOutcome::NoReply;
        }
        let text = self.runner.render(&settings.fallback_message, session);
        outbox.text(&text, None).await;
        DispatchOutcome::Fallback
    }

    /// Creates a handoff and tracks it on success.
    async fn hand_off(
        &self,
        key: &ContactKey,
        team_id: Option<String>,
        notes: String,
        source: HandoffSource,
    ) {
        let request = HandoffRequest {
            contact: key.clone(),
            team_id: team_id.clone(),
            notes,
            source,
        };
        match self.services.handoff.create_handoff(request).await {
            Ok(()) => {
                info!(contact = %key, source = %source, "handed off to agent");
                self.handoffs.insert(
                    key.clone(),
                    HandoffRecord {
                        team_id,
                        created_at: Utc::now(),
                    },
                );
            }
            Err(e) => warn!(contact = %key, source = %source, error = %e, "failed to create handoff"),
        }
    }
}
