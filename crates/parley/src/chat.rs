// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive console chat for `parley chat`.
//!
//! Runs the dispatcher against a bot definition file with in-memory storage
//! and console adapters. API fetch steps and completion webhooks make real
//! HTTP requests.

use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use parley_agent::{DispatchOutcome, Dispatcher};
use parley_config::ParleyConfig;
use parley_core::Services;
use parley_core::error::ParleyError;
use parley_core::traits::{HandoffService, MessageSender};
use parley_core::types::{Button, ContactKey, HandoffRequest, InboundMessage, MessageId};
use parley_http::{HttpFetcher, HttpWebhookDispatcher};
use parley_storage::{HandoffTracker, MemoryConversationLog, MemorySessionStore, StaticCatalog};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Prints outbound messages and remembers the last reply buttons shown.
#[derive(Default)]
pub struct ConsoleSender {
    next_id: AtomicU64,
    last_buttons: Mutex<Vec<Button>>,
}

impl ConsoleSender {
    fn message_id(&self) -> MessageId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        MessageId(format!("console-{n}"))
    }

    /// Title of the most recently shown reply button with `id`.
    pub fn button_title(&self, id: &str) -> Option<String> {
        self.last_buttons
            .lock()
            .ok()?
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.title.clone())
    }

    fn print_body(body: &str) {
        for line in body.lines() {
            println!("{} {line}", "bot>".cyan().bold());
        }
    }
}

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send_text(&self, _contact: &ContactKey, text: &str) -> Result<MessageId, ParleyError> {
        Self::print_body(text);
        Ok(self.message_id())
    }

    async fn send_buttons(
        &self,
        _contact: &ContactKey,
        body: &str,
        buttons: &[Button],
    ) -> Result<MessageId, ParleyError> {
        Self::print_body(body);
        for button in buttons {
            println!("     [{}] {}", button.id.yellow(), button.title);
        }
        if let Ok(mut last) = self.last_buttons.lock() {
            *last = buttons.to_vec();
        }
        Ok(self.message_id())
    }

    async fn send_cta_url(
        &self,
        _contact: &ContactKey,
        body: &str,
        button_title: &str,
        url: &str,
    ) -> Result<MessageId, ParleyError> {
        Self::print_body(body);
        println!("     {} {}", button_title.underline(), url.dimmed());
        Ok(self.message_id())
    }
}

/// Announces handoffs on the console.
pub struct ConsoleHandoff;

#[async_trait]
impl HandoffService for ConsoleHandoff {
    async fn create_handoff(&self, request: HandoffRequest) -> Result<(), ParleyError> {
        let queue = request.team_id.as_deref().unwrap_or("general");
        println!(
            "{}",
            format!(
                "-- handed off to the {queue} queue ({}): {}",
                request.source, request.notes
            )
            .magenta()
        );
        Ok(())
    }
}

/// What the user typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Reset,
    Click(&'a str),
    Text(&'a str),
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => Input::Empty,
        "/quit" | "/exit" => Input::Quit,
        "/reset" => Input::Reset,
        _ => match trimmed.strip_prefix("/click ") {
            Some(id) if !id.trim().is_empty() => Input::Click(id.trim()),
            _ => Input::Text(trimmed),
        },
    }
}

/// Runs the REPL until the user quits.
pub async fn run_chat(config: &ParleyConfig, bot: &Path, contact: &str) -> Result<(), ParleyError> {
    let definition = match parley_config::load_bot_definition(bot) {
        Ok(definition) => definition,
        Err(e) => {
            let message = e.to_string();
            parley_config::render_errors(&[e]);
            return Err(ParleyError::Config(message));
        }
    };
    if let Err(errors) = parley_config::validate_bot_definition(&definition) {
        parley_config::render_errors(&errors);
        return Err(ParleyError::Config(format!(
            "{} has {} problem(s), see `parley check`",
            bot.display(),
            errors.len()
        )));
    }
    let ai_wanted = definition.settings.ai.enabled;

    let sender = Arc::new(ConsoleSender::default());
    let services = Services {
        sender: sender.clone(),
        fetcher: Arc::new(HttpFetcher::new(&config.http, config.engine.max_loop_iterations)?),
        handoff: Arc::new(ConsoleHandoff),
        webhooks: Arc::new(HttpWebhookDispatcher::new(
            &config.http,
            config.engine.max_loop_iterations,
        )?),
        log: Arc::new(MemoryConversationLog::new()),
        sessions: Arc::new(MemorySessionStore::new()),
        catalog: Arc::new(StaticCatalog::new(definition)),
        ai: None,
    };
    let handoffs = Arc::new(HandoffTracker::new(Duration::from_secs(
        config.engine.handoff_tracking_ttl_secs,
    )));
    let dispatcher = Dispatcher::new(
        services,
        handoffs,
        config.engine.clone(),
        config.messages.clone(),
    );
    let key = ContactKey::new(config.bot.tenant_id.clone(), contact, "console");

    let mut rl = DefaultEditor::new()
        .map_err(|e| ParleyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "parley chat".bold().green());
    println!(
        "Type {} to press a button, {} to return from a handoff, {} to exit.\n",
        "/click <id>".yellow(),
        "/reset".yellow(),
        "/quit".yellow()
    );
    if ai_wanted {
        println!("{}", "AI replies are not available in the console.".dimmed());
    }

    let prompt = format!("{}> ", contact.green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let msg = match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Reset => {
                if dispatcher.release_handoff(&key) {
                    println!("{}", "-- back with the bot".dimmed());
                } else {
                    println!("{}", "-- no active handoff".dimmed());
                }
                continue;
            }
            Input::Click(id) => {
                let title = sender.button_title(id).unwrap_or_else(|| id.to_string());
                InboundMessage::button_reply(key.clone(), id, title)
            }
            Input::Text(text) => InboundMessage::text(key.clone(), text),
        };
        let _ = rl.add_history_entry(line.as_str());

        match dispatcher.dispatch(msg).await {
            Ok(DispatchOutcome::HumanHandling) => {
                println!("{}", "-- a human agent has this conversation (/reset to return)".dimmed());
            }
            Ok(outcome) => debug!(outcome = %outcome, "dispatched"),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("  "), Input::Empty);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("/exit"), Input::Quit);
        assert_eq!(parse_input("/reset"), Input::Reset);
        assert_eq!(parse_input("/click btn_2"), Input::Click("btn_2"));
        assert_eq!(parse_input("/click "), Input::Text("/click"));
        assert_eq!(parse_input(" hello "), Input::Text("hello"));
    }

    #[tokio::test]
    async fn sender_remembers_button_titles() {
        let sender = ConsoleSender::default();
        let key = ContactKey::new("t", "c", "console");
        sender
            .send_buttons(
                &key,
                "Pick",
                &[Button::reply("btn_1", "Yes"), Button::reply("btn_2", "No")],
            )
            .await
            .unwrap();
        assert_eq!(sender.button_title("btn_2").as_deref(), Some("No"));
        assert_eq!(sender.button_title("btn_3"), None);

        let first = sender.send_text(&key, "hi").await.unwrap();
        let second = sender.send_text(&key, "again").await.unwrap();
        assert_ne!(first, second);
    }
}
