// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Every section is optional and defaults to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Conversation engine limits and timeouts.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default user-facing messages.
    #[serde(default)]
    pub messages: MessagesConfig,

    /// Outbound HTTP client settings for fetch steps and webhooks.
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Which bot definition to serve.
    #[serde(default)]
    pub bot: BotConfig,
}

/// Engine limits and timeouts.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Minutes of inactivity after which a session is replaced.
    #[serde(default = "default_session_timeout_minutes")]
    pub session_timeout_minutes: u32,

    /// Cap on iterations of one template loop.
    #[serde(default = "default_max_loop_iterations")]
    pub max_loop_iterations: usize,

    /// Cap on steps visited by one skip/auto-advance run.
    #[serde(default = "default_max_auto_advance_steps")]
    pub max_auto_advance_steps: usize,

    /// Retries allowed on a step that does not set `max_retries`.
    #[serde(default = "default_max_retries")]
    pub default_max_retries: u32,

    /// How long a contact stays marked as handed off to a human.
    #[serde(default = "default_handoff_tracking_ttl_secs")]
    pub handoff_tracking_ttl_secs: u64,

    /// Handle messages of one contact one at a time.
    #[serde(default = "default_serialize_per_contact")]
    pub serialize_per_contact: bool,

    /// Recent turns handed to the AI responder when settings do not say.
    #[serde(default = "default_ai_history_limit")]
    pub ai_history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_timeout_minutes: default_session_timeout_minutes(),
            max_loop_iterations: default_max_loop_iterations(),
            max_auto_advance_steps: default_max_auto_advance_steps(),
            default_max_retries: default_max_retries(),
            handoff_tracking_ttl_secs: default_handoff_tracking_ttl_secs(),
            serialize_per_contact: default_serialize_per_contact(),
            ai_history_limit: default_ai_history_limit(),
        }
    }
}

fn default_session_timeout_minutes() -> u32 {
    30
}

fn default_max_loop_iterations() -> usize {
    50
}

fn default_max_auto_advance_steps() -> usize {
    100
}

fn default_max_retries() -> u32 {
    3
}

fn default_handoff_tracking_ttl_secs() -> u64 {
    86_400
}

fn default_serialize_per_contact() -> bool {
    true
}

fn default_ai_history_limit() -> usize {
    10
}

/// Default user-facing messages, used when a flow or tenant sets none.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagesConfig {
    /// Sent when a cancel keyword stops a flow without its own cancel message.
    #[serde(default = "default_cancel_message")]
    pub cancel: String,

    /// Re-prompt after an answer that matches none of the step's buttons.
    #[serde(default = "default_invalid_choice_message")]
    pub invalid_choice: String,

    /// Sent when a contact runs out of retries on a button step.
    #[serde(default = "default_retries_exhausted_message")]
    pub retries_exhausted: String,

    /// Re-prompt after a free-text answer fails validation without a step message.
    #[serde(default = "default_validation_error_message")]
    pub validation_error: String,

    /// Sent before a keyword-triggered transfer without a tenant message.
    #[serde(default = "default_transfer_message")]
    pub transfer: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            cancel: default_cancel_message(),
            invalid_choice: default_invalid_choice_message(),
            retries_exhausted: default_retries_exhausted_message(),
            validation_error: default_validation_error_message(),
            transfer: default_transfer_message(),
        }
    }
}

fn default_cancel_message() -> String {
    "Okay, I've cancelled that. Send a message any time to start again.".to_string()
}

fn default_invalid_choice_message() -> String {
    "Please choose one of the options below.".to_string()
}

fn default_retries_exhausted_message() -> String {
    "Sorry, I couldn't understand your answer. Let's start over later.".to_string()
}

fn default_validation_error_message() -> String {
    "That doesn't look right. Please try again.".to_string()
}

fn default_transfer_message() -> String {
    "Connecting you with a member of our team.".to_string()
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("parley/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Bot definition source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Path to the bot definition TOML file.
    #[serde(default)]
    pub definition_path: Option<String>,

    /// Tenant the console chat runs as.
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            definition_path: None,
            tenant_id: default_tenant_id(),
        }
    }
}

fn default_tenant_id() -> String {
    "default".to_string()
}
