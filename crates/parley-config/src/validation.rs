// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation.
//!
//! Checks semantic constraints serde cannot express. Every check runs; all
//! failures are collected rather than stopping at the first.

use std::collections::HashSet;

use parley_core::rules::MatchType;
use parley_core::settings::BotDefinition;
use parley_core::types::ButtonKind;

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn invalid(errors: &mut Vec<ConfigError>, message: String) {
    errors.push(ConfigError::Validation { message });
}

/// Validate an engine configuration.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let engine = &config.engine;

    if engine.session_timeout_minutes == 0 {
        invalid(&mut errors, "engine.session_timeout_minutes must be at least 1".into());
    }
    if engine.max_loop_iterations == 0 {
        invalid(&mut errors, "engine.max_loop_iterations must be at least 1".into());
    }
    if engine.max_auto_advance_steps == 0 {
        invalid(&mut errors, "engine.max_auto_advance_steps must be at least 1".into());
    }
    if engine.default_max_retries == 0 {
        invalid(&mut errors, "engine.default_max_retries must be at least 1".into());
    }
    if engine.handoff_tracking_ttl_secs == 0 {
        invalid(&mut errors, "engine.handoff_tracking_ttl_secs must be at least 1".into());
    }
    if config.http.timeout_secs == 0 {
        invalid(&mut errors, "http.timeout_secs must be at least 1".into());
    }

    let messages = [
        ("messages.cancel", &config.messages.cancel),
        ("messages.invalid_choice", &config.messages.invalid_choice),
        ("messages.retries_exhausted", &config.messages.retries_exhausted),
        ("messages.validation_error", &config.messages.validation_error),
        ("messages.transfer", &config.messages.transfer),
    ];
    for (key, text) in messages {
        if text.trim().is_empty() {
            invalid(&mut errors, format!("{key} must not be empty"));
        }
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(
            &mut errors,
            format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    if config.bot.tenant_id.trim().is_empty() {
        invalid(&mut errors, "bot.tenant_id must not be empty".into());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate the tenant-level parts of a bot definition: settings, keyword
/// rules and flow identity. Step-level checks live with the flow runner.
pub fn validate_bot_definition(def: &BotDefinition) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(hours) = &def.settings.business_hours {
        if !(-14 * 60..=14 * 60).contains(&hours.utc_offset_minutes) {
            invalid(
                &mut errors,
                format!(
                    "settings.business_hours.utc_offset_minutes {} is outside -840..=840",
                    hours.utc_offset_minutes
                ),
            );
        }
        for (i, window) in hours.windows.iter().enumerate() {
            if window.times().is_none() {
                invalid(
                    &mut errors,
                    format!(
                        "settings.business_hours.windows[{i}] times `{}`-`{}` must be HH:MM",
                        window.open, window.close
                    ),
                );
            }
        }
        if !hours.allow_automation_outside_hours && hours.out_of_hours_message.trim().is_empty() {
            invalid(
                &mut errors,
                "settings.business_hours.out_of_hours_message must not be empty".into(),
            );
        }
    }

    for (i, button) in def.settings.greeting_buttons.iter().enumerate() {
        if button.title.trim().is_empty() {
            invalid(&mut errors, format!("settings.greeting_buttons[{i}] has no title"));
        }
        if button.kind == ButtonKind::Url && button.url.is_none() {
            invalid(&mut errors, format!("settings.greeting_buttons[{i}] is a url button without a url"));
        }
    }

    for (i, rule) in def.rules.iter().enumerate() {
        let name = if rule.id.is_empty() {
            format!("rules[{i}]")
        } else {
            format!("rules[{i}] `{}`", rule.id)
        };
        if rule.keywords.iter().all(|k| k.trim().is_empty()) {
            invalid(&mut errors, format!("{name} has no keywords"));
        }
        if rule.match_type == MatchType::Regex {
            for keyword in &rule.keywords {
                if let Err(e) = regex::Regex::new(keyword) {
                    invalid(&mut errors, format!("{name} keyword `{keyword}` is not a valid regex: {e}"));
                }
            }
        }
        if !rule.has_usable_response() {
            invalid(&mut errors, format!("{name} is a text rule with no body and no buttons"));
        }
    }

    let mut seen = HashSet::new();
    for (i, flow) in def.flows.iter().enumerate() {
        if flow.id.trim().is_empty() {
            invalid(&mut errors, format!("flows[{i}].id must not be empty"));
        } else if !seen.insert(flow.id.as_str()) {
            invalid(&mut errors, format!("duplicate flow id `{}`", flow.id));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
