// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot definition files.
//!
//! A bot definition is a TOML document with a `[settings]` table and
//! `[[rules]]` / `[[flows]]` arrays.

use std::path::Path;

use parley_core::settings::BotDefinition;

use crate::diagnostic::{ConfigError, bot_definition_error};

/// Parse a bot definition from TOML text. `name` labels diagnostics.
pub fn parse_bot_definition(name: &str, content: &str) -> Result<BotDefinition, ConfigError> {
    toml::from_str(content).map_err(|e| bot_definition_error(name, content, &e))
}

/// Read and parse a bot definition file.
pub fn load_bot_definition(path: &Path) -> Result<BotDefinition, ConfigError> {
    let shown = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: shown.clone(),
        source,
    })?;
    let def = parse_bot_definition(&shown, &content)?;
    tracing::debug!(
        path = %shown,
        rules = def.rules.len(),
        flows = def.flows.len(),
        "bot definition loaded"
    );
    Ok(def)
}
