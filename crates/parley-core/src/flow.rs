// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow and step definitions.
//!
//! A flow is an ordered list of steps. Each step renders a message, optionally
//! waits for an answer, stores it, and names the step that comes next. Flows
//! are read-only while they run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::rules::MatchType;
use crate::types::Button;

/// A scripted multi-step conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flow {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Keywords that start this flow.
    #[serde(default)]
    pub trigger_keywords: Vec<String>,
    #[serde(default = "default_trigger_match_type")]
    pub trigger_match_type: MatchType,
    /// Keywords that abort this flow while it runs.
    #[serde(default)]
    pub cancel_keywords: Vec<String>,
    #[serde(default)]
    pub cancel_message: Option<String>,
    #[serde(default)]
    pub initial_message: String,
    #[serde(default)]
    pub completion_message: String,
    #[serde(default)]
    pub on_complete: OnComplete,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_true() -> bool {
    true
}

fn default_trigger_match_type() -> MatchType {
    MatchType::Exact
}

impl Flow {
    /// Creates an enabled flow with no steps.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            trigger_keywords: Vec::new(),
            trigger_match_type: default_trigger_match_type(),
            cancel_keywords: Vec::new(),
            cancel_message: None,
            initial_message: String::new(),
            completion_message: String::new(),
            on_complete: OnComplete::None,
            steps: Vec::new(),
        }
    }

    /// Looks up a step and its position by name.
    pub fn step(&self, name: &str) -> Option<(usize, &Step)> {
        self.steps.iter().enumerate().find(|(_, s)| s.name == name)
    }

    pub fn first_step(&self) -> Option<&Step> {
        self.steps.first()
    }

    /// The step following position `index` in declaration order.
    pub fn successor(&self, index: usize) -> Option<&Step> {
        self.steps.get(index + 1)
    }
}

/// What an [`InputType`] step expects from the contact.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Button,
    Select,
    /// No answer expected; the flow advances right after the message is sent.
    None,
}

/// One step of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub name: String,
    /// Message template rendered against session data.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub kind: StepKind,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub validation_regex: Option<String>,
    #[serde(default)]
    pub validation_error: Option<String>,
    #[serde(default)]
    pub retry_on_invalid: bool,
    /// Zero means the engine default.
    #[serde(default)]
    pub max_retries: u32,
    /// Session-data key the answer is stored under.
    #[serde(default)]
    pub store_as: Option<String>,
    #[serde(default)]
    pub next_step: Option<String>,
    /// Answer or button id to target step. The `default` key is the fallback.
    #[serde(default)]
    pub conditional_next: BTreeMap<String, String>,
    /// Boolean expression; when true the step is skipped.
    #[serde(default)]
    pub skip_condition: Option<String>,
}

impl Step {
    /// A plain text step waiting for a free-text answer.
    pub fn text(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            kind: StepKind::Text,
            input_type: InputType::Text,
            validation_regex: None,
            validation_error: None,
            retry_on_invalid: false,
            max_retries: 0,
            store_as: None,
            next_step: None,
            conditional_next: BTreeMap::new(),
            skip_condition: None,
        }
    }

    /// A button step waiting for a button answer.
    pub fn buttons(name: impl Into<String>, message: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            kind: StepKind::Buttons { buttons },
            input_type: InputType::Button,
            ..Self::text(name, message)
        }
    }

    /// Buttons configured on this step, as written in the definition.
    pub fn configured_buttons(&self) -> &[Button] {
        match &self.kind {
            StepKind::Buttons { buttons } => buttons,
            _ => &[],
        }
    }

    /// Whether the step waits for the contact before moving on.
    pub fn awaits_input(&self) -> bool {
        self.input_type != InputType::None
    }
}

/// How a step's message is produced and delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Plain text message.
    #[default]
    Text,
    /// Message with interactive buttons.
    Buttons { buttons: Vec<Button> },
    /// Message built from an external API call.
    ApiFetch(ApiFetchConfig),
    /// Hands the conversation to a human agent. Always ends the flow.
    Transfer(TransferConfig),
}

impl StepKind {
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Text => "text",
            StepKind::Buttons { .. } => "buttons",
            StepKind::ApiFetch(_) => "api_fetch",
            StepKind::Transfer(_) => "transfer",
        }
    }
}

/// External request made by an `api_fetch` step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFetchConfig {
    /// URL template.
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// Header value templates.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request body template.
    #[serde(default)]
    pub body: Option<String>,
    /// Response path (`data.items[0].name`) to session-data key.
    #[serde(default)]
    pub response_mapping: BTreeMap<String, String>,
    /// Response path holding a message to show when the step has none.
    #[serde(default)]
    pub message_path: Option<String>,
    /// Response path holding a list of buttons.
    #[serde(default)]
    pub buttons_path: Option<String>,
    /// Sent instead of the step message when the fetch fails.
    #[serde(default)]
    pub fallback_message: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ApiFetchConfig {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: default_method(),
            headers: BTreeMap::new(),
            body: None,
            response_mapping: BTreeMap::new(),
            message_path: None,
            buttons_path: None,
            fallback_message: None,
        }
    }
}

/// Human handoff configuration of a `transfer` step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Team queue; `None` uses the general queue.
    #[serde(default)]
    pub team_id: Option<String>,
    /// Notes template handed to the agent.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Side effect fired when a flow completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OnComplete {
    #[default]
    None,
    Webhook(WebhookAction),
}

/// Webhook fired on flow completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAction {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Body template. When absent a JSON summary of the session is posted.
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_lookup_and_successor() {
        let mut flow = Flow::new("f", "Flow");
        flow.steps = vec![Step::text("a", "A"), Step::text("b", "B")];
        let (idx, step) = flow.step("b").unwrap();
        assert_eq!(idx, 1);
        assert_eq!(step.message, "B");
        assert_eq!(flow.successor(0).map(|s| s.name.as_str()), Some("b"));
        assert!(flow.successor(1).is_none());
        assert!(flow.step("missing").is_none());
    }

    #[test]
    fn step_kind_deserializes_from_tagged_table() {
        let toml_str = r#"
id = "survey"
trigger_keywords = ["survey"]

[[steps]]
name = "intro"
message = "Hi"
input_type = "none"

[[steps]]
name = "pick"
message = "Pick one"
input_type = "button"
store_as = "choice"
kind = { type = "buttons", buttons = [{ title = "Yes" }, { title = "No" }] }

[[steps]]
name = "lookup"
message = "Result: {{result}}"
kind = { type = "api_fetch", url = "https://api.example.com/x", response_mapping = { "data.value" = "result" } }

[[steps]]
name = "agent"
kind = { type = "transfer", team_id = "support" }

[on_complete]
type = "webhook"
url = "https://hooks.example.com/done"
"#;
        let flow: Flow = toml::from_str(toml_str).unwrap();
        assert!(flow.enabled);
        assert_eq!(flow.trigger_match_type, MatchType::Exact);
        assert_eq!(flow.steps[0].input_type, InputType::None);
        assert_eq!(flow.steps[1].configured_buttons().len(), 2);
        match &flow.steps[2].kind {
            StepKind::ApiFetch(cfg) => {
                assert_eq!(cfg.method, "GET");
                assert_eq!(cfg.response_mapping["data.value"], "result");
            }
            other => panic!("expected api_fetch, got {other:?}"),
        }
        match &flow.steps[3].kind {
            StepKind::Transfer(cfg) => assert_eq!(cfg.team_id.as_deref(), Some("support")),
            other => panic!("expected transfer, got {other:?}"),
        }
        assert!(matches!(flow.on_complete, OnComplete::Webhook(_)));
    }

    #[test]
    fn missing_kind_defaults_to_text() {
        let step: Step = toml::from_str("name = \"a\"\nmessage = \"hello\"").unwrap();
        assert_eq!(step.kind, StepKind::Text);
        assert_eq!(step.input_type, InputType::Text);
        assert!(step.awaits_input());
    }

    #[test]
    fn unknown_step_field_is_rejected() {
        let result = toml::from_str::<Step>("name = \"a\"\nmesage = \"typo\"");
        assert!(result.is_err());
    }
}
