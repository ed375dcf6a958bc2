// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message delivery for one session.
//!
//! Send and log failures are logged and swallowed: a channel outage must not
//! change which step a conversation is on.

use std::sync::Arc;

use parley_core::session::Session;
use parley_core::traits::{ConversationLog, MessageSender};
use parley_core::types::{Button, ContactKey, Direction, SessionId};
use parley_core::Services;
use tracing::{debug, warn};

/// Sends messages to one contact and records them in the conversation log.
pub struct Outbox {
    sender: Arc<dyn MessageSender>,
    log: Arc<dyn ConversationLog>,
    session_id: SessionId,
    contact: ContactKey,
}

impl Outbox {
    pub fn new(services: &Services, session: &Session) -> Self {
        Self {
            sender: services.sender.clone(),
            log: services.log.clone(),
            session_id: session.id.clone(),
            contact: session.key.clone(),
        }
    }

    /// Sends plain text. Blank text is not sent.
    pub async fn text(&self, text: &str, step: Option<&str>) {
        if text.trim().is_empty() {
            return;
        }
        if let Err(e) = self.sender.send_text(&self.contact, text).await {
            warn!(contact = %self.contact, error = %e, "failed to send text message");
            return;
        }
        self.record(text, step).await;
    }

    /// Sends a message with reply buttons.
    ///
    /// Without buttons this degrades to [`Outbox::text`].
    pub async fn buttons(&self, body: &str, buttons: &[Button], step: Option<&str>) {
        if buttons.is_empty() {
            self.text(body, step).await;
            return;
        }
        if let Err(e) = self.sender.send_buttons(&self.contact, body, buttons).await {
            warn!(contact = %self.contact, error = %e, "failed to send button message");
            return;
        }
        self.record(body, step).await;
    }

    /// Sends a call-to-action message with one URL button.
    pub async fn cta(&self, body: &str, button_title: &str, url: &str, step: Option<&str>) {
        if let Err(e) = self
            .sender
            .send_cta_url(&self.contact, body, button_title, url)
            .await
        {
            warn!(contact = %self.contact, error = %e, "failed to send call-to-action message");
            return;
        }
        self.record(body, step).await;
    }

    async fn record(&self, text: &str, step: Option<&str>) {
        debug!(session_id = %self.session_id, step = step.unwrap_or(""), "message sent");
        if let Err(e) = self
            .log
            .log_step(&self.session_id, Direction::Outbound, text, step)
            .await
        {
            warn!(session_id = %self.session_id, error = %e, "failed to log outbound message");
        }
    }
}
