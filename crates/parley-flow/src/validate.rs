// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static checks of a flow definition.
//!
//! The runner copes with every problem reported here at runtime (a dangling
//! step reference completes the flow, a bad regex accepts all answers), so
//! these are warnings for bot authors rather than load errors.

use std::collections::HashSet;

use parley_core::flow::{Flow, OnComplete, StepKind};
use parley_core::types::ButtonKind;
use regex::Regex;

/// A problem found in a flow definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowIssue {
    #[error("step `{step}` is defined more than once")]
    DuplicateStep { step: String },

    #[error("step `{step}`: {field} points to unknown step `{target}`")]
    DanglingReference {
        step: String,
        field: &'static str,
        target: String,
    },

    #[error("step `{step}`: invalid validation_regex: {error}")]
    InvalidRegex { step: String, error: String },

    #[error("step `{step}`: button {position} has no title")]
    UntitledButton { step: String, position: usize },

    #[error("step `{step}`: url button `{title}` has no url")]
    MissingButtonUrl { step: String, title: String },

    #[error("on_complete webhook has no url")]
    MissingWebhookUrl,
}

/// Reports every problem in `flow`, in step order.
pub fn validate_flow(flow: &Flow) -> Vec<FlowIssue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for step in &flow.steps {
        if !seen.insert(step.name.as_str()) {
            issues.push(FlowIssue::DuplicateStep {
                step: step.name.clone(),
            });
        }
    }

    for step in &flow.steps {
        if let Some(target) = step.next_step.as_deref()
            && !seen.contains(target)
        {
            issues.push(FlowIssue::DanglingReference {
                step: step.name.clone(),
                field: "next_step",
                target: target.to_string(),
            });
        }
        for target in step.conditional_next.values() {
            if !seen.contains(target.as_str()) {
                issues.push(FlowIssue::DanglingReference {
                    step: step.name.clone(),
                    field: "conditional_next",
                    target: target.clone(),
                });
            }
        }

        if let Some(pattern) = step.validation_regex.as_deref()
            && let Err(e) = Regex::new(pattern)
        {
            issues.push(FlowIssue::InvalidRegex {
                step: step.name.clone(),
                error: e.to_string(),
            });
        }

        if let StepKind::Buttons { buttons } = &step.kind {
            for (i, button) in buttons.iter().enumerate() {
                if button.title.trim().is_empty() {
                    issues.push(FlowIssue::UntitledButton {
                        step: step.name.clone(),
                        position: i + 1,
                    });
                }
                if button.kind == ButtonKind::Url
                    && button.url.as_deref().is_none_or(|u| u.trim().is_empty())
                {
                    issues.push(FlowIssue::MissingButtonUrl {
                        step: step.name.clone(),
                        title: button.title.clone(),
                    });
                }
            }
        }
    }

    if let OnComplete::Webhook(action) = &flow.on_complete
        && action.url.trim().is_empty()
    {
        issues.push(FlowIssue::MissingWebhookUrl);
    }

    issues
}
