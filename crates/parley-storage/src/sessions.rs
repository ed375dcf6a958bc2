// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `DashMap`-backed session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parley_core::error::ParleyError;
use parley_core::session::Session;
use parley_core::traits::SessionStore;
use parley_core::types::ContactKey;

/// Keeps every session ever created, grouped by contact.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<ContactKey, Vec<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of sessions across all contacts.
    pub fn len(&self) -> usize {
        self.sessions.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_active(
        &self,
        key: &ContactKey,
        active_since: DateTime<Utc>,
    ) -> Result<Option<Session>, ParleyError> {
        Ok(self.sessions.get(key).and_then(|list| {
            list.iter()
                .filter(|s| s.is_active() && s.last_activity_at > active_since)
                .max_by_key(|s| s.last_activity_at)
                .cloned()
        }))
    }

    async fn insert(&self, session: &Session) -> Result<(), ParleyError> {
        self.sessions
            .entry(session.key.clone())
            .or_default()
            .push(session.clone());
        Ok(())
    }

    async fn save(&self, session: &Session) -> Result<(), ParleyError> {
        let mut list = self
            .sessions
            .get_mut(&session.key)
            .ok_or_else(|| ParleyError::not_found("session", session.id.to_string()))?;
        let slot = list
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or_else(|| ParleyError::not_found("session", session.id.to_string()))?;
        *slot = session.clone();
        Ok(())
    }

    async fn list(&self, key: &ContactKey) -> Result<Vec<Session>, ParleyError> {
        Ok(self
            .sessions
            .get(key)
            .map(|list| list.clone())
            .unwrap_or_default())
    }
}
