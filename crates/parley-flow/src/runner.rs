// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session flow state machine.
//!
//! A session is either not in a flow, waiting at a named step, or has just
//! left the flow by completing it or by exiting early (cancel keyword,
//! transfer step, exhausted retries). The runner mutates the session in
//! place; persisting it is the caller's job.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parley_config::{EngineConfig, MessagesConfig};
use parley_core::flow::{Flow, InputType, OnComplete, Step, StepKind, TransferConfig};
use parley_core::session::Session;
use parley_core::types::{Button, HandoffRequest, HandoffSource, InboundMessage, with_generated_ids};
use parley_core::{ApiFetchConfig, Services};
use parley_router::contains_cancel_keyword;
use parley_storage::{HandoffRecord, HandoffTracker};
use parley_template::{Renderer, evaluate_expression};
use regex::Regex;
use strum::Display;
use tracing::{debug, info, warn};

use crate::buttons::{match_button, split_buttons};
use crate::outbound::Outbox;

/// Where a session stands after the runner handled it.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowState {
    /// Waiting for the contact to answer the named step.
    AtStep(String),
    /// The flow ran to its end; the session is completed.
    Completed,
    /// The flow was left early; see the session status for whether it closed.
    Exited,
}

/// Result of rendering one step.
enum Rendered {
    Sent,
    /// The step ended the flow (transfer).
    Exited,
}

/// Executes flows against sessions.
pub struct FlowRunner {
    services: Services,
    handoffs: Arc<HandoffTracker>,
    renderer: Renderer,
    max_auto_advance_steps: usize,
    default_max_retries: u32,
    messages: MessagesConfig,
}

impl FlowRunner {
    pub fn new(
        services: Services,
        handoffs: Arc<HandoffTracker>,
        engine: &EngineConfig,
        messages: MessagesConfig,
    ) -> Self {
        Self {
            services,
            handoffs,
            renderer: Renderer::new(engine.max_loop_iterations),
            max_auto_advance_steps: engine.max_auto_advance_steps,
            default_max_retries: engine.default_max_retries,
            messages,
        }
    }

    /// Renders a template against the session's data.
    pub fn render(&self, template: &str, session: &Session) -> String {
        self.renderer.render(template, session.data.as_map())
    }

    /// The buttons as the contact sees them: generated ids, rendered titles.
    fn rendered_buttons(&self, buttons: &[Button], session: &Session) -> Vec<Button> {
        with_generated_ids(buttons)
            .into_iter()
            .map(|mut b| {
                b.title = self.render(&b.title, session);
                b
            })
            .collect()
    }

    /// Starts `flow` from its first step.
    ///
    /// Session data is reset. A flow without steps completes immediately.
    pub async fn start_flow(&self, session: &mut Session, flow: &Flow) -> FlowState {
        info!(
            tenant_id = %session.key.tenant_id,
            contact = %session.key.contact,
            session_id = %session.id,
            flow_id = %flow.id,
            "starting flow"
        );
        session.data.clear();
        session.current_flow_id = Some(flow.id.clone());
        session.current_step = None;
        session.step_retries = 0;

        if !flow.initial_message.trim().is_empty() {
            let text = self.render(&flow.initial_message, session);
            Outbox::new(&self.services, session).text(&text, None).await;
        }

        match flow.first_step() {
            Some(step) => {
                let first = step.name.clone();
                self.send_step_with_skip_check(session, flow, &first).await
            }
            None => self.complete_flow(session, flow).await,
        }
    }

    /// Runs the step named `start`, following skips and no-input steps until
    /// a step waits for an answer or the flow ends.
    ///
    /// A step reached twice in one run, a step name that does not exist, or
    /// more than `max_auto_advance_steps` steps complete the flow.
    pub async fn send_step_with_skip_check(
        &self,
        session: &mut Session,
        flow: &Flow,
        start: &str,
    ) -> FlowState {
        let mut visited: HashSet<String> = HashSet::new();
        let mut current = start.to_string();

        loop {
            if visited.len() >= self.max_auto_advance_steps {
                warn!(
                    flow_id = %flow.id,
                    step = %current,
                    limit = self.max_auto_advance_steps,
                    "auto-advance limit reached, completing flow"
                );
                return self.complete_flow(session, flow).await;
            }
            let Some((index, step)) = flow.step(&current) else {
                warn!(
                    tenant_id = %session.key.tenant_id,
                    flow_id = %flow.id,
                    step = %current,
                    "step not found, completing flow"
                );
                return self.complete_flow(session, flow).await;
            };
            if !visited.insert(current.clone()) {
                warn!(flow_id = %flow.id, step = %current, "step cycle detected, completing flow");
                return self.complete_flow(session, flow).await;
            }
            session.enter_step(step.name.clone());

            if let Some(condition) = step.skip_condition.as_deref()
                && evaluate_expression(condition, session.data.as_map())
            {
                debug!(flow_id = %flow.id, step = %step.name, "skip condition true");
                match sequential_next(flow, index, step) {
                    Some(next) => {
                        current = next;
                        continue;
                    }
                    None => return self.complete_flow(session, flow).await,
                }
            }

            if let Rendered::Exited = self.render_step(session, flow, step).await {
                return FlowState::Exited;
            }

            if step.awaits_input() {
                return FlowState::AtStep(step.name.clone());
            }
            match sequential_next(flow, index, step) {
                Some(next) => current = next,
                None => return self.complete_flow(session, flow).await,
            }
        }
    }

    /// Handles the contact's answer to the step the session waits on.
    pub async fn process_response(
        &self,
        session: &mut Session,
        flow: &Flow,
        msg: &InboundMessage,
    ) -> FlowState {
        let outbox = Outbox::new(&self.services, session);

        if contains_cancel_keyword(flow, &msg.text) {
            info!(session_id = %session.id, flow_id = %flow.id, "flow cancelled by contact");
            let template = flow
                .cancel_message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(&self.messages.cancel);
            let text = self.render(template, session);
            outbox.text(&text, None).await;
            session.exit_flow();
            return FlowState::Exited;
        }

        let Some((index, step)) = session
            .current_step
            .as_deref()
            .and_then(|name| flow.step(name))
        else {
            warn!(
                session_id = %session.id,
                flow_id = %flow.id,
                step = session.current_step.as_deref().unwrap_or(""),
                "current step missing from flow, exiting"
            );
            session.exit_flow();
            return FlowState::Exited;
        };
        let max_retries = if step.max_retries == 0 {
            self.default_max_retries
        } else {
            step.max_retries
        };

        if let Some(pattern) = step.validation_regex.as_deref()
            && !msg.is_button_reply()
            && !passes_validation(pattern, &msg.text)
        {
            session.step_retries += 1;
            if step.retry_on_invalid && session.step_retries < max_retries {
                debug!(
                    flow_id = %flow.id,
                    step = %step.name,
                    retries = session.step_retries,
                    "answer failed validation"
                );
                let template = step
                    .validation_error
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(&self.messages.validation_error);
                let text = self.render(template, session);
                outbox.text(&text, Some(&step.name)).await;
                return FlowState::AtStep(step.name.clone());
            }
            debug!(flow_id = %flow.id, step = %step.name, "accepting answer that failed validation");
        }

        let shown = self.rendered_buttons(step.configured_buttons(), session);
        let (reply_buttons, _) = split_buttons(&shown);
        let expects_choice = matches!(step.input_type, InputType::Button | InputType::Select);
        let mut chosen: Option<Button> = None;
        if !reply_buttons.is_empty() && (expects_choice || msg.is_button_reply()) {
            match match_button(&reply_buttons, msg) {
                Some(button) => chosen = Some(button.clone()),
                None => {
                    session.step_retries += 1;
                    if session.step_retries >= max_retries {
                        warn!(
                            session_id = %session.id,
                            flow_id = %flow.id,
                            step = %step.name,
                            "retries exhausted, closing session"
                        );
                        outbox
                            .text(&self.messages.retries_exhausted, Some(&step.name))
                            .await;
                        session.complete(Utc::now());
                        return FlowState::Exited;
                    }
                    outbox
                        .buttons(&self.messages.invalid_choice, &reply_buttons, Some(&step.name))
                        .await;
                    return FlowState::AtStep(step.name.clone());
                }
            }
        }

        if let Some(key) = step.store_as.as_deref().filter(|k| !k.is_empty()) {
            match &chosen {
                Some(button) => {
                    session.data.set(key, button.title.clone());
                    session.data.set(format!("{key}_title"), button.title.clone());
                    session.data.set(format!("{key}_id"), button.id.clone());
                }
                None => {
                    session.data.set(key, msg.text.trim());
                }
            }
        }

        match resolve_next(flow, index, step, msg, chosen.as_ref()) {
            Some(next) => self.send_step_with_skip_check(session, flow, &next).await,
            None => self.complete_flow(session, flow).await,
        }
    }

    /// Sends the completion message, fires the completion webhook and marks
    /// the session completed.
    pub async fn complete_flow(&self, session: &mut Session, flow: &Flow) -> FlowState {
        if !flow.completion_message.trim().is_empty() {
            let text = self.render(&flow.completion_message, session);
            Outbox::new(&self.services, session).text(&text, None).await;
        }
        session.complete(Utc::now());
        info!(session_id = %session.id, flow_id = %flow.id, "flow completed");

        if let OnComplete::Webhook(_) = flow.on_complete {
            let webhooks = self.services.webhooks.clone();
            let flow = flow.clone();
            let snapshot = session.clone();
            tokio::spawn(async move {
                if let Err(e) = webhooks.dispatch(&flow, &snapshot, &snapshot.key).await {
                    warn!(flow_id = %flow.id, error = %e, "completion webhook failed");
                }
            });
        }
        FlowState::Completed
    }

    async fn render_step(&self, session: &mut Session, flow: &Flow, step: &Step) -> Rendered {
        let step_name = Some(step.name.as_str());
        match &step.kind {
            StepKind::Text => {
                let text = self.render(&step.message, session);
                Outbox::new(&self.services, session)
                    .text(&text, step_name)
                    .await;
            }
            StepKind::Buttons { buttons } => {
                let body = self.render(&step.message, session);
                let buttons = self.rendered_buttons(buttons, session);
                self.send_with_buttons(session, &body, &buttons, step_name)
                    .await;
            }
            StepKind::ApiFetch(config) => {
                self.render_api_fetch(session, step, config).await;
            }
            StepKind::Transfer(config) => {
                self.render_transfer(session, flow, step, config).await;
                return Rendered::Exited;
            }
        }
        Rendered::Sent
    }

    /// Sends reply buttons with the body, then each URL button as its own
    /// call-to-action. With no reply buttons the first call-to-action
    /// carries the body.
    pub async fn send_with_buttons(
        &self,
        session: &Session,
        body: &str,
        buttons: &[Button],
        step: Option<&str>,
    ) {
        let outbox = Outbox::new(&self.services, session);
        let (replies, links) = split_buttons(buttons);
        if !replies.is_empty() || links.is_empty() {
            outbox.buttons(body, &replies, step).await;
        }
        for (i, link) in links.iter().enumerate() {
            let Some(url) = link.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                warn!(button = %link.title, "url button without url, skipped");
                continue;
            };
            let cta_body = if replies.is_empty() && i == 0 {
                body
            } else {
                link.title.as_str()
            };
            outbox.cta(cta_body, &link.title, url, step).await;
        }
    }

    async fn render_api_fetch(&self, session: &mut Session, step: &Step, config: &ApiFetchConfig) {
        let step_name = Some(step.name.as_str());
        match self
            .services
            .fetcher
            .fetch(config, &session.data, &step.message)
            .await
        {
            Ok(response) => {
                session.data.merge(response.mapped_data);
                let template = if step.message.trim().is_empty() {
                    response.message.unwrap_or_default()
                } else {
                    step.message.clone()
                };
                let body = self.render(&template, session);
                let buttons = with_generated_ids(&response.buttons);
                self.send_with_buttons(session, &body, &buttons, step_name)
                    .await;
            }
            Err(e) => {
                warn!(
                    tenant_id = %session.key.tenant_id,
                    session_id = %session.id,
                    step = %step.name,
                    error = %e,
                    "api fetch failed, sending fallback"
                );
                let text = match config.fallback_message.as_deref() {
                    Some(fallback) if !fallback.trim().is_empty() => self.render(fallback, session),
                    _ => step.message.clone(),
                };
                Outbox::new(&self.services, session)
                    .text(&text, step_name)
                    .await;
            }
        }
    }

    async fn render_transfer(
        &self,
        session: &mut Session,
        flow: &Flow,
        step: &Step,
        config: &TransferConfig,
    ) {
        if !step.message.trim().is_empty() {
            let text = self.render(&step.message, session);
            Outbox::new(&self.services, session)
                .text(&text, Some(&step.name))
                .await;
        }

        let notes = match config.notes.as_deref() {
            Some(template) => self.render(template, session),
            None => format!("Transferred from flow '{}' at step '{}'", flow.id, step.name),
        };
        let request = HandoffRequest {
            contact: session.key.clone(),
            team_id: config.team_id.clone(),
            notes,
            source: HandoffSource::FlowStep,
        };
        match self.services.handoff.create_handoff(request).await {
            Ok(()) => {
                info!(
                    session_id = %session.id,
                    flow_id = %flow.id,
                    team_id = config.team_id.as_deref().unwrap_or("general"),
                    "handed off to agent"
                );
                self.handoffs.insert(
                    session.key.clone(),
                    HandoffRecord {
                        team_id: config.team_id.clone(),
                        created_at: Utc::now(),
                    },
                );
            }
            Err(e) => {
                warn!(session_id = %session.id, flow_id = %flow.id, error = %e, "failed to create handoff");
            }
        }
        session.exit_flow();
    }
}

/// `next_step`, else the following step in declaration order.
fn sequential_next(flow: &Flow, index: usize, step: &Step) -> Option<String> {
    step.next_step
        .clone()
        .or_else(|| flow.successor(index).map(|s| s.name.clone()))
}

/// Picks the step after an accepted answer.
///
/// Order: clicked button id in `conditional_next`, the answer text exactly,
/// the answer text ignoring case, the `default` branch, then
/// [`sequential_next`].
fn resolve_next(
    flow: &Flow,
    index: usize,
    step: &Step,
    msg: &InboundMessage,
    chosen: Option<&Button>,
) -> Option<String> {
    let branches = &step.conditional_next;
    if !branches.is_empty() {
        let button_id = chosen.map(|b| b.id.as_str()).or(msg.button_id.as_deref());
        if let Some(target) = button_id.and_then(|id| branches.get(id)) {
            return Some(target.clone());
        }
        let text = msg.text.trim();
        if let Some(target) = branches.get(text) {
            return Some(target.clone());
        }
        let lowered = text.to_lowercase();
        if let Some((_, target)) = branches
            .iter()
            .find(|(answer, _)| answer.to_lowercase() == lowered)
        {
            return Some(target.clone());
        }
        if let Some(target) = branches.get("default") {
            return Some(target.clone());
        }
    }
    sequential_next(flow, index, step)
}

/// Whether `answer` passes the step's validation pattern.
///
/// An invalid pattern accepts everything.
fn passes_validation(pattern: &str, answer: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(answer.trim()),
        Err(e) => {
            warn!(pattern, error = %e, "invalid validation regex, accepting answer");
            true
        }
    }
}
