// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The engine drives its side effects through these traits. All of them use
//! `#[async_trait]` so they can be held as `Arc<dyn Trait>`.

pub mod audit;
pub mod catalog;
pub mod channel;
pub mod fetch;
pub mod handoff;
pub mod provider;
pub mod storage;
pub mod webhook;

pub use audit::ConversationLog;
pub use catalog::BotCatalog;
pub use channel::MessageSender;
pub use fetch::ExternalFetcher;
pub use handoff::HandoffService;
pub use provider::AiResponder;
pub use storage::SessionStore;
pub use webhook::WebhookDispatcher;
