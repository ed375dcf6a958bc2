// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Parley configuration system.

use std::io::Write;

use parley_config::diagnostic::ConfigError;
use parley_config::model::ParleyConfig;
use parley_config::{
    load_and_validate_path, load_and_validate_str, load_bot_definition, load_config_from_str,
    validate_bot_definition,
};
use serial_test::serial;

#[test]
fn valid_toml_deserializes_into_parley_config() {
    let toml = r#"
[engine]
session_timeout_minutes = 15
max_loop_iterations = 20
serialize_per_contact = false

[messages]
cancel = "Cancelled."

[http]
timeout_secs = 3

[logging]
level = "debug"

[bot]
definition_path = "bots/support.toml"
tenant_id = "acme"
"#;
    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.engine.session_timeout_minutes, 15);
    assert_eq!(config.engine.max_loop_iterations, 20);
    assert!(!config.engine.serialize_per_contact);
    assert_eq!(config.engine.max_auto_advance_steps, 100);
    assert_eq!(config.messages.cancel, "Cancelled.");
    assert_eq!(config.http.timeout_secs, 3);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.bot.definition_path.as_deref(), Some("bots/support.toml"));
    assert_eq!(config.bot.tenant_id, "acme");
}

#[test]
fn serialized_defaults_are_sensible() {
    let config = ParleyConfig::default();
    assert_eq!(config.engine.session_timeout_minutes, 30);
    assert_eq!(config.engine.max_loop_iterations, 50);
    assert_eq!(config.engine.max_auto_advance_steps, 100);
    assert_eq!(config.engine.default_max_retries, 3);
    assert_eq!(config.engine.handoff_tracking_ttl_secs, 86_400);
    assert!(config.engine.serialize_per_contact);
    assert_eq!(config.engine.ai_history_limit, 10);
    assert_eq!(config.http.timeout_secs, 10);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.bot.tenant_id, "default");
    assert!(config.bot.definition_path.is_none());
}

#[test]
fn unknown_key_gets_a_suggestion() {
    let toml = "[engine]\nsession_timout_minutes = 5\n";
    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            ..
        } => {
            assert_eq!(key, "session_timout_minutes");
            assert_eq!(suggestion.as_deref(), Some("session_timeout_minutes"));
            assert!(valid_keys.contains("max_loop_iterations"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let errors = load_and_validate_str("[enigne]\nx = 1\n").expect_err("should reject");
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn invalid_type_is_reported() {
    let errors =
        load_and_validate_str("[engine]\nmax_loop_iterations = \"many\"\n").expect_err("bad type");
    assert!(
        matches!(errors[0], ConfigError::InvalidType { .. }),
        "got {:?}",
        errors[0]
    );
}

#[test]
fn validation_runs_after_deserialization() {
    let errors = load_and_validate_str("[engine]\nmax_auto_advance_steps = 0\n")
        .expect_err("zero cap should fail validation");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}

#[test]
fn diagnostics_render_with_miette() {
    let errors = load_and_validate_str("[logging]\nlevle = \"info\"\n").unwrap_err();
    let handler = miette::GraphicalReportHandler::new();
    let mut out = String::new();
    handler
        .render_report(&mut out, &errors[0])
        .expect("render should succeed");
    assert!(out.contains("levle"));
}

#[test]
#[serial]
fn env_var_overrides_file_value() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[engine]\nsession_timeout_minutes = 20").unwrap();

    // SAFETY: serialised with the other env-mutating tests.
    unsafe { std::env::set_var("PARLEY_ENGINE_SESSION_TIMEOUT_MINUTES", "45") };
    let result = load_and_validate_path(file.path());
    unsafe { std::env::remove_var("PARLEY_ENGINE_SESSION_TIMEOUT_MINUTES") };

    let config = result.expect("config should load");
    assert_eq!(config.engine.session_timeout_minutes, 45);
}

#[test]
#[serial]
fn file_value_used_without_env() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[bot]\ntenant_id = \"acme\"").unwrap();
    let config = load_and_validate_path(file.path()).expect("config should load");
    assert_eq!(config.bot.tenant_id, "acme");
    assert_eq!(config.engine.session_timeout_minutes, 30);
}

#[test]
fn bot_definition_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot.toml");
    std::fs::write(
        &path,
        r#"
[settings]
greeting = "Hi! Type 'menu' to begin."
fallback_message = "Sorry, I didn't get that."

[[rules]]
id = "human"
keywords = ["agent", "human"]
response_type = "transfer"
team_id = "support"

[[flows]]
id = "menu"
trigger_keywords = ["menu"]
cancel_keywords = ["cancel"]

[[flows.steps]]
name = "choose"
message = "What do you need?"
input_type = "button"
store_as = "topic"
kind = { type = "buttons", buttons = [{ title = "Billing" }, { title = "Tech" }] }
"#,
    )
    .unwrap();

    let def = load_bot_definition(&path).expect("bot definition should load");
    assert_eq!(def.rules[0].team_id.as_deref(), Some("support"));
    assert_eq!(def.flows[0].steps[0].configured_buttons().len(), 2);
    assert!(validate_bot_definition(&def).is_ok());
}
