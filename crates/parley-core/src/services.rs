// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bundle of collaborator handles shared by the engine components.

use std::sync::Arc;

use crate::traits::{
    AiResponder, BotCatalog, ConversationLog, ExternalFetcher, HandoffService, MessageSender,
    SessionStore, WebhookDispatcher,
};

/// Shared handles to every collaborator the engine talks to.
///
/// Cloning is cheap. The AI responder is optional; without one the AI
/// fallback branch never fires.
#[derive(Clone)]
pub struct Services {
    pub sender: Arc<dyn MessageSender>,
    pub fetcher: Arc<dyn ExternalFetcher>,
    pub handoff: Arc<dyn HandoffService>,
    pub webhooks: Arc<dyn WebhookDispatcher>,
    pub log: Arc<dyn ConversationLog>,
    pub sessions: Arc<dyn SessionStore>,
    pub catalog: Arc<dyn BotCatalog>,
    pub ai: Option<Arc<dyn AiResponder>>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("ai", &self.ai.is_some())
            .finish_non_exhaustive()
    }
}
