// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory adapters for the Parley collaborator traits.
//!
//! These back the console chat and the test suites. They keep everything in
//! process memory and lose it on exit.

pub mod catalog;
pub mod log;
pub mod sessions;
pub mod ttl;

pub use catalog::StaticCatalog;
pub use log::{LogEntry, MemoryConversationLog};
pub use sessions::MemorySessionStore;
pub use ttl::{HandoffRecord, HandoffTracker, TtlStore};
