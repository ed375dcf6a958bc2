// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use parley_core::types::ContactKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per contact.
///
/// Entries exist only while some task holds or waits for the lock.
#[derive(Debug, Default)]
pub struct ContactLocks {
    locks: Arc<DashMap<ContactKey, Arc<Mutex<()>>>>,
}

impl ContactLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the lock for `key`.
    pub async fn lock(&self, key: &ContactKey) -> ContactGuard {
        let mutex = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.lock_owned().await;
        ContactGuard {
            locks: self.locks.clone(),
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// Number of contacts with a held or awaited lock.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds a contact's lock until dropped.
pub struct ContactGuard {
    locks: Arc<DashMap<ContactKey, Arc<Mutex<()>>>>,
    key: ContactKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ContactGuard {
    fn drop(&mut self) {
        // The registry and this guard are the only owners when nobody waits.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) <= 2);
        self.guard.take();
    }
}
