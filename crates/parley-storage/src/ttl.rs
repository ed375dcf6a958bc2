// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyed store whose entries expire after a fixed time-to-live.

use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parley_core::types::ContactKey;
use tokio::time::Instant;

/// Concurrent map with per-entry expiry.
///
/// Expired entries are dropped lazily on access, on every insert and by
/// [`TtlStore::purge_expired`].
#[derive(Debug)]
pub struct TtlStore<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, (V, Instant)>,
    ttl: Duration,
}

impl<K, V> TtlStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Inserts or refreshes `key`, returning the previous live value.
    ///
    /// Expired entries under other keys are purged first.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let now = Instant::now();
        let expires = now + self.ttl;
        self.entries.retain(|k, (_, exp)| *exp > now || *k == key);
        self.entries
            .insert(key, (value, expires))
            .filter(|(_, exp)| *exp > now)
            .map(|(v, _)| v)
    }

    /// The live value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let hit = self.entries.get(key).map(|e| (e.0.clone(), e.1));
        match hit {
            Some((value, expires)) if expires > now => Some(value),
            Some(_) => {
                self.entries.remove_if(key, |_, (_, exp)| *exp <= now);
                None
            }
            None => None,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .remove(key)
            .and_then(|(_, (v, exp))| (exp > now).then_some(v))
    }

    /// Drops every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, (_, exp)| *exp > now);
        before - self.entries.len()
    }

    /// Number of entries, counting expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A contact handed over to a human agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRecord {
    pub team_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contacts currently handled by a human, keyed by contact.
pub type HandoffTracker = TtlStore<ContactKey, HandoffRecord>;
