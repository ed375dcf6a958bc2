// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ParleyError;
use crate::session::Session;
use crate::types::ContactKey;

/// Persists conversation sessions.
///
/// The store does not lock between [`SessionStore::find_active`] and
/// [`SessionStore::insert`]; callers serialise per contact when they need to.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Most recently active `active` session for `key` whose last activity is
    /// after `active_since`.
    async fn find_active(
        &self,
        key: &ContactKey,
        active_since: DateTime<Utc>,
    ) -> Result<Option<Session>, ParleyError>;

    async fn insert(&self, session: &Session) -> Result<(), ParleyError>;

    /// Overwrites an existing session.
    async fn save(&self, session: &Session) -> Result<(), ParleyError>;

    /// All sessions ever created for `key`, oldest first.
    async fn list(&self, key: &ContactKey) -> Result<Vec<Session>, ParleyError>;
}
