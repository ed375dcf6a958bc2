// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound message delivery (WhatsApp, SMS, console).

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{Button, ContactKey, MessageId};

/// Delivers outbound messages to a contact.
///
/// Interactive channels cannot mix reply buttons and URL buttons in one
/// message, so call-to-action links go through [`MessageSender::send_cta_url`].
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends a plain text message.
    async fn send_text(&self, contact: &ContactKey, text: &str) -> Result<MessageId, ParleyError>;

    /// Sends a message with quick-reply buttons.
    async fn send_buttons(
        &self,
        contact: &ContactKey,
        body: &str,
        buttons: &[Button],
    ) -> Result<MessageId, ParleyError>;

    /// Sends a call-to-action message with a single URL button.
    async fn send_cta_url(
        &self,
        contact: &ContactKey,
        body: &str,
        button_title: &str,
        url: &str,
    ) -> Result<MessageId, ParleyError>;
}
