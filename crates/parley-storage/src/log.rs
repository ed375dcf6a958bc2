// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parley_core::error::ParleyError;
use parley_core::traits::ConversationLog;
use parley_core::types::{ChatTurn, Direction, SessionId};

/// One logged message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub direction: Direction,
    pub text: String,
    pub step: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct MemoryConversationLog {
    entries: DashMap<SessionId, Vec<LogEntry>>,
}

impl MemoryConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry logged for a session, oldest first.
    pub fn entries(&self, session_id: &SessionId) -> Vec<LogEntry> {
        self.entries
            .get(session_id)
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConversationLog for MemoryConversationLog {
    async fn log_step(
        &self,
        session_id: &SessionId,
        direction: Direction,
        text: &str,
        step: Option<&str>,
    ) -> Result<(), ParleyError> {
        self.entries
            .entry(session_id.clone())
            .or_default()
            .push(LogEntry {
                direction,
                text: text.to_string(),
                step: step.map(str::to_string),
                at: Utc::now(),
            });
        Ok(())
    }

    async fn recent_history(
        &self,
        session_id: &SessionId,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, ParleyError> {
        let Some(entries) = self.entries.get(session_id) else {
            return Ok(Vec::new());
        };
        let skip = entries.len().saturating_sub(limit);
        Ok(entries
            .iter()
            .skip(skip)
            .map(|e| ChatTurn {
                direction: e.direction,
                text: e.text.clone(),
            })
            .collect())
    }
}
