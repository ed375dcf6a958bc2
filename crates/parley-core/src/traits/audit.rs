// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{ChatTurn, Direction, SessionId};

/// Records every inbound and outbound message of a session.
#[async_trait]
pub trait ConversationLog: Send + Sync {
    /// Appends one entry. `step` names the flow step that produced or
    /// received the message, if any.
    async fn log_step(
        &self,
        session_id: &SessionId,
        direction: Direction,
        text: &str,
        step: Option<&str>,
    ) -> Result<(), ParleyError>;

    /// Returns up to `limit` most recent entries, oldest first.
    async fn recent_history(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, ParleyError>;
}
