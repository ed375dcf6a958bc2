// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session store wrapper that slows down lookups.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use parley_core::error::ParleyError;
use parley_core::session::Session;
use parley_core::traits::SessionStore;
use parley_core::types::ContactKey;

/// Delays every `find_active` result by a fixed duration.
///
/// Concurrent handlers for one contact then all finish their lookup before
/// any of them inserts, which exposes the lookup-then-create race.
pub struct DelayedSessionStore {
    inner: Arc<dyn SessionStore>,
    delay: Duration,
}

impl DelayedSessionStore {
    pub fn new(inner: Arc<dyn SessionStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl SessionStore for DelayedSessionStore {
    async fn find_active(
        &self,
        key: &ContactKey,
        active_since: DateTime<Utc>,
    ) -> Result<Option<Session>, ParleyError> {
        let found = self.inner.find_active(key, active_since).await?;
        tokio::time::sleep(self.delay).await;
        Ok(found)
    }

    async fn insert(&self, session: &Session) -> Result<(), ParleyError> {
        self.inner.insert(session).await
    }

    async fn save(&self, session: &Session) -> Result<(), ParleyError> {
        self.inner.save(session).await
    }

    async fn list(&self, key: &ContactKey) -> Result<Vec<Session>, ParleyError> {
        self.inner.list(key).await
    }
}
