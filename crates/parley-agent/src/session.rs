// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lookup and lifecycle.
//!
//! Lookup-then-create is not atomic in the store. Two messages from the same
//! contact handled at once can both miss and both create a session; the
//! dispatcher prevents this by serialising per contact.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use parley_core::error::ParleyError;
use parley_core::session::Session;
use parley_core::traits::SessionStore;
use parley_core::types::ContactKey;
use parley_storage::HandoffTracker;
use tracing::debug;

/// Finds, creates and persists sessions.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    handoffs: Arc<HandoffTracker>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, handoffs: Arc<HandoffTracker>) -> Self {
        Self { store, handoffs }
    }

    /// Returns the contact's live session, or a new one.
    ///
    /// A session is live when it is active and its last activity falls within
    /// `timeout`. A found session is touched; a new one is inserted right
    /// away. The flag is true for a new session.
    pub async fn get_or_create(
        &self,
        key: &ContactKey,
        timeout: TimeDelta,
    ) -> Result<(Session, bool), ParleyError> {
        let now = Utc::now();
        if let Some(mut session) = self.store.find_active(key, now - timeout).await? {
            session.touch(now);
            debug!(contact = %key, session_id = %session.id, "resuming session");
            return Ok((session, false));
        }

        let session = Session::new(key.clone(), now);
        self.store.insert(&session).await?;
        debug!(contact = %key, session_id = %session.id, "created session");
        Ok((session, true))
    }

    /// Marks the session completed, persists it and drops the contact's
    /// handoff tracking.
    pub async fn close(&self, session: &mut Session) -> Result<(), ParleyError> {
        session.complete(Utc::now());
        self.store.save(session).await?;
        if self.handoffs.remove(&session.key).is_some() {
            debug!(
                contact = %session.key,
                session_id = %session.id,
                "handoff released on close"
            );
        }
        Ok(())
    }

    /// Leaves the running flow without closing the session.
    pub fn exit_flow(&self, session: &mut Session) {
        session.exit_flow();
    }

    pub async fn save(&self, session: &Session) -> Result<(), ParleyError> {
        self.store.save(session).await
    }
}
