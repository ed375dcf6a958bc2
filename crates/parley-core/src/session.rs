// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation session record.
//!
//! A session tracks one ongoing conversation for a [`ContactKey`]: whether a
//! flow is running, which step it waits on, and the flow's working memory.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::data::SessionData;
use crate::types::{ContactKey, SessionId};

/// Lifecycle status of a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Cancelled,
}

/// One conversation with a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub key: ContactKey,
    pub status: SessionStatus,
    pub current_flow_id: Option<String>,
    pub current_step: Option<String>,
    /// Invalid answers given on the current step. Reset on every step change.
    pub step_retries: u32,
    pub data: SessionData,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Creates a fresh active session with empty data.
    pub fn new(key: ContactKey, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            key,
            status: SessionStatus::Active,
            current_flow_id: None,
            current_step: None,
            step_retries: 0,
            data: SessionData::new(),
            started_at: now,
            last_activity_at: now,
            completed_at: None,
        }
    }

    /// Whether a flow is currently running.
    pub fn in_flow(&self) -> bool {
        self.current_flow_id.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether the session is still usable at `now` under `timeout`.
    pub fn is_live(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        self.is_active() && self.last_activity_at > now - timeout
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
    }

    /// Moves to `step`, resetting the retry counter.
    pub fn enter_step(&mut self, step: impl Into<String>) {
        self.current_step = Some(step.into());
        self.step_retries = 0;
    }

    /// Leaves the running flow without completing the session.
    pub fn exit_flow(&mut self) {
        self.current_flow_id = None;
        self.current_step = None;
        self.step_retries = 0;
    }

    /// Marks the session completed and clears flow tracking.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.exit_flow();
        self.status = SessionStatus::Completed;
        self.completed_at = Some(now);
    }
}
