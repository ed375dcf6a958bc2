// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - a rule-and-flow conversation engine for messaging bots.
//!
//! This is the binary entry point: an interactive console chat against a bot
//! definition, a definition checker, and a config dump.

mod chat;
mod check;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parley_config::ParleyConfig;

/// Parley - a rule-and-flow conversation engine for messaging bots.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Chat with a bot in the terminal.
    Chat {
        /// Bot definition file. Defaults to `bot.definition_path`.
        #[arg(long)]
        bot: Option<PathBuf>,
        /// Contact id to chat as.
        #[arg(long, default_value = "console")]
        contact: String,
    },
    /// Validate a bot definition.
    Check {
        /// Bot definition file. Defaults to `bot.definition_path`.
        #[arg(long)]
        bot: Option<PathBuf>,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => parley_config::load_and_validate_path(path),
        None => parley_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    match cli.command {
        Some(Commands::Chat { bot, contact }) => {
            let path = bot_path(bot, &config);
            if let Err(e) = chat::run_chat(&config, &path, &contact).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Check { bot }) => {
            let path = bot_path(bot, &config);
            let report = check::check_bot(&path);
            report.print(&path);
            if !report.is_clean() {
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("error: failed to serialize config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("parley: use --help for available commands");
        }
    }
}

/// The bot file from the command line, else from config.
fn bot_path(flag: Option<PathBuf>, config: &ParleyConfig) -> PathBuf {
    match flag.or_else(|| config.bot.definition_path.as_ref().map(PathBuf::from)) {
        Some(path) => path,
        None => {
            eprintln!("error: no bot definition given (use --bot or set bot.definition_path)");
            std::process::exit(2);
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parley={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
