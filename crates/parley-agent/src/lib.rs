// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session management and inbound message dispatch for Parley.
//!
//! [`Dispatcher`] is the single entry point for an inbound message. It loads
//! or creates the contact's session through [`SessionManager`], decides which
//! behaviour answers (human handoff, keyword rule, flow, greeting, AI or
//! fallback) and persists the session once at the end.

pub mod dispatcher;
pub mod lock;
pub mod session;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use lock::ContactLocks;
pub use session::SessionManager;
