// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword rule definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::Button;

/// How a keyword is compared against inbound text.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchType {
    /// Full-string equality.
    Exact,
    /// Substring.
    #[default]
    Contains,
    /// Prefix.
    StartsWith,
    /// Regular expression. Invalid patterns never match.
    Regex,
}

/// What a matched rule does.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseType {
    /// Reply with the rule's body and buttons.
    #[default]
    Text,
    /// Hand the conversation to a human agent.
    Transfer,
}

/// Reply content of a keyword rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleResponse {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

/// A keyword-triggered reply or transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordRule {
    #[serde(default)]
    pub id: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Higher priorities are tried first; ties keep configured order.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub response_type: ResponseType,
    #[serde(default)]
    pub response: RuleResponse,
    /// Team queue for transfer rules.
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl KeywordRule {
    /// A text-reply rule matching any of `keywords` by substring.
    pub fn text<S: Into<String>>(keywords: impl IntoIterator<Item = S>, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            match_type: MatchType::Contains,
            case_sensitive: false,
            priority: 0,
            response_type: ResponseType::Text,
            response: RuleResponse {
                body: body.into(),
                buttons: Vec::new(),
            },
            team_id: None,
            enabled: true,
        }
    }

    /// A transfer rule matching any of `keywords` by substring.
    pub fn transfer<S: Into<String>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            response_type: ResponseType::Transfer,
            ..Self::text(keywords, "")
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.response_type == ResponseType::Transfer
    }

    /// Whether a match on this rule can produce a response.
    ///
    /// Transfer rules always can; text rules need a body or buttons.
    pub fn has_usable_response(&self) -> bool {
        self.is_transfer()
            || !self.response.body.trim().is_empty()
            || !self.response.buttons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_response_rules() {
        assert!(KeywordRule::transfer(["refund"]).has_usable_response());
        assert!(KeywordRule::text(["hi"], "Hello!").has_usable_response());
        assert!(!KeywordRule::text(["hi"], "   ").has_usable_response());
    }

    #[test]
    fn match_type_round_trips_through_strings() {
        use std::str::FromStr;
        for mt in [
            MatchType::Exact,
            MatchType::Contains,
            MatchType::StartsWith,
            MatchType::Regex,
        ] {
            assert_eq!(MatchType::from_str(&mt.to_string()).unwrap(), mt);
        }
        assert_eq!(MatchType::StartsWith.to_string(), "starts_with");
    }
}
