// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types exchanged between the engine and its collaborators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a message, as assigned by the messaging provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Identifies one conversation partner: (tenant, contact, channel).
///
/// At most one active session exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactKey {
    pub tenant_id: String,
    /// Channel-specific contact address (phone number, chat id).
    pub contact: String,
    pub channel: String,
}

impl ContactKey {
    pub fn new(
        tenant_id: impl Into<String>,
        contact: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            contact: contact.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for ContactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tenant_id, self.channel, self.contact)
    }
}

/// An inbound message received from the messaging channel.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub key: ContactKey,
    /// Message text. For button replies this is the clicked button's title.
    pub text: String,
    /// Id of the clicked button, when the message is an interactive reply.
    pub button_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    /// Builds a plain text message.
    pub fn text(key: ContactKey, text: impl Into<String>) -> Self {
        Self {
            id: MessageId(uuid::Uuid::new_v4().to_string()),
            key,
            text: text.into(),
            button_id: None,
            received_at: Utc::now(),
        }
    }

    /// Builds an interactive button reply.
    pub fn button_reply(
        key: ContactKey,
        button_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            button_id: Some(button_id.into()),
            ..Self::text(key, title)
        }
    }

    /// Whether the message came from a button click.
    pub fn is_button_reply(&self) -> bool {
        self.button_id.is_some()
    }

    /// Whether there is anything for the engine to act on.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || self.button_id.is_some()
    }
}

/// Kind of an interactive button.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ButtonKind {
    /// Quick-reply button; clicking it sends a reply back to the engine.
    #[default]
    Reply,
    /// Call-to-action button that opens a URL.
    Url,
}

/// An interactive button attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Button {
    /// Button id. Left blank in configuration, it is generated as `btn_<n>`.
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: ButtonKind,
    /// Target URL for [`ButtonKind::Url`] buttons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Button {
    /// A reply button with an explicit id.
    pub fn reply(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: ButtonKind::Reply,
            url: None,
        }
    }

    /// A call-to-action URL button.
    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            kind: ButtonKind::Url,
            url: Some(url.into()),
        }
    }
}

/// Returns the buttons with blank ids replaced by `btn_<1-based index>`.
///
/// Both rendering and reply validation go through this function so that the
/// ids a contact can click always match the ids the engine accepts.
pub fn with_generated_ids(buttons: &[Button]) -> Vec<Button> {
    buttons
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let mut b = b.clone();
            if b.id.trim().is_empty() {
                b.id = format!("btn_{}", i + 1);
            }
            b
        })
        .collect()
}

/// Direction of a logged conversation entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// One entry of recent conversation history, as handed to the AI responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub direction: Direction,
    pub text: String,
}

/// What caused a human handoff.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HandoffSource {
    ChatbotDisabled,
    KeywordRule,
    FlowStep,
}

/// Arguments for starting a human-agent transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRequest {
    pub contact: ContactKey,
    /// Team queue; `None` routes to the general queue.
    pub team_id: Option<String>,
    pub notes: String,
    pub source: HandoffSource,
}

/// Result of an external API fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    /// Message text supplied by the API, if any.
    pub message: Option<String>,
    /// Buttons supplied by the API, forwarded with the step message.
    pub buttons: Vec<Button>,
    /// Values extracted through the step's response mapping, keyed by session key.
    pub mapped_data: serde_json::Map<String, serde_json::Value>,
}
