// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley check`: static validation of a bot definition file.

use std::path::Path;

use colored::Colorize;
use parley_config::{ConfigError, load_bot_definition, render_errors, validate_bot_definition};
use parley_flow::{FlowIssue, validate_flow};

/// Everything wrong with one bot definition.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Parse errors and tenant-level problems.
    pub errors: Vec<ConfigError>,
    /// Step-level problems, keyed by flow id.
    pub flow_issues: Vec<(String, FlowIssue)>,
    pub flows: usize,
    pub rules: usize,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.flow_issues.is_empty()
    }

    pub fn print(&self, path: &Path) {
        render_errors(&self.errors);
        for (flow_id, issue) in &self.flow_issues {
            let report = miette::miette!("flow `{flow_id}`: {issue}");
            eprintln!("{report:?}");
        }

        if self.is_clean() {
            println!(
                "{} {} ({} rules, {} flows)",
                "ok".green().bold(),
                path.display(),
                self.rules,
                self.flows
            );
        } else {
            let count = self.errors.len() + self.flow_issues.len();
            println!(
                "{} {}: {count} problem(s)",
                "failed".red().bold(),
                path.display()
            );
        }
    }
}

/// Loads the definition at `path` and runs every static check on it.
pub fn check_bot(path: &Path) -> CheckReport {
    let def = match load_bot_definition(path) {
        Ok(def) => def,
        Err(e) => {
            return CheckReport {
                errors: vec![e],
                ..CheckReport::default()
            };
        }
    };

    let mut report = CheckReport {
        flows: def.flows.len(),
        rules: def.rules.len(),
        ..CheckReport::default()
    };
    if let Err(errors) = validate_bot_definition(&def) {
        report.errors = errors;
    }
    for flow in &def.flows {
        report
            .flow_issues
            .extend(validate_flow(flow).into_iter().map(|i| (flow.id.clone(), i)));
    }
    report
}
