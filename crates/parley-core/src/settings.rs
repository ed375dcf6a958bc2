// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tenant chatbot settings and the bot definition bundle.

use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::Flow;
use crate::rules::KeywordRule;
use crate::types::Button;

pub use chrono::Weekday;

/// Chatbot behaviour for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatbotSettings {
    /// When false every conversation is handed to a human.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sent on the first message of a new session. Empty disables the greeting.
    #[serde(default)]
    pub greeting: String,
    #[serde(default)]
    pub greeting_buttons: Vec<Button>,
    /// Sent when nothing else handled the message.
    #[serde(default)]
    pub fallback_message: String,
    /// Sent before a keyword-triggered transfer. Falls back to the engine default.
    #[serde(default)]
    pub transfer_message: Option<String>,
    /// Overrides the engine-wide session timeout.
    #[serde(default)]
    pub session_timeout_minutes: Option<u32>,
    #[serde(default)]
    pub business_hours: Option<BusinessHours>,
    #[serde(default)]
    pub ai: AiSettings,
}

fn default_true() -> bool {
    true
}

impl Default for ChatbotSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            greeting: String::new(),
            greeting_buttons: Vec::new(),
            fallback_message: String::new(),
            transfer_message: None,
            session_timeout_minutes: None,
            business_hours: None,
            ai: AiSettings::default(),
        }
    }
}

impl ChatbotSettings {
    pub fn has_greeting(&self) -> bool {
        !self.greeting.trim().is_empty()
    }

    /// Whether automation may answer at `now`.
    ///
    /// True when no business hours are configured, when they allow automation
    /// outside opening times, or when the business is open.
    pub fn automation_allowed_at(&self, now: DateTime<Utc>) -> bool {
        match &self.business_hours {
            None => true,
            Some(hours) => hours.allow_automation_outside_hours || hours.is_open_at(now),
        }
    }
}

/// Weekly opening times in a fixed UTC offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessHours {
    /// Offset of the business's local time from UTC, in minutes.
    #[serde(default)]
    pub utc_offset_minutes: i32,
    /// Opening windows. Days without a window are closed; no windows at all
    /// means always open.
    #[serde(default)]
    pub windows: Vec<OpeningWindow>,
    #[serde(default)]
    pub out_of_hours_message: String,
    #[serde(default)]
    pub allow_automation_outside_hours: bool,
}

/// One opening window, e.g. `{ day = "mon", open = "09:00", close = "17:00" }`.
///
/// A window whose close time is not after its open time runs past midnight
/// into the following day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpeningWindow {
    pub day: Weekday,
    pub open: String,
    pub close: String,
}

impl OpeningWindow {
    /// Parses `open` and `close` as `HH:MM`.
    pub fn times(&self) -> Option<(NaiveTime, NaiveTime)> {
        let open = NaiveTime::parse_from_str(self.open.trim(), "%H:%M").ok()?;
        let close = NaiveTime::parse_from_str(self.close.trim(), "%H:%M").ok()?;
        Some((open, close))
    }

    fn contains(&self, day: Weekday, time: NaiveTime) -> bool {
        let Some((open, close)) = self.times() else {
            return false;
        };
        if open < close {
            day == self.day && time >= open && time < close
        } else {
            (day == self.day && time >= open) || (day == self.day.succ() && time < close)
        }
    }
}

impl BusinessHours {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }

    /// Whether the business is open at the given instant.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if self.windows.is_empty() {
            return true;
        }
        let local = now.with_timezone(&self.offset());
        let day = local.weekday();
        let time = local.time();
        self.windows.iter().any(|w| w.contains(day, time))
    }
}

/// Settings for the optional AI fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AiSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Provider name, passed through to the responder.
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub system_prompt: String,
    /// Number of recent turns handed to the responder. Falls back to the engine default.
    #[serde(default)]
    pub history_limit: Option<usize>,
}

/// Everything a tenant's bot is made of.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotDefinition {
    #[serde(default)]
    pub settings: ChatbotSettings,
    #[serde(default)]
    pub rules: Vec<KeywordRule>,
    #[serde(default)]
    pub flows: Vec<Flow>,
}

impl BotDefinition {
    pub fn flow(&self, id: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.id == id)
    }
}
