// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow step interpreter for the Parley conversation engine.
//!
//! [`FlowRunner`] drives one session through a [`Flow`](parley_core::Flow):
//! starting it, rendering steps (with skip conditions and auto-advance),
//! validating answers, branching, and completing. Outbound sends go through
//! [`Outbox`], which logs every message and never fails the caller.

pub mod buttons;
pub mod outbound;
pub mod runner;
pub mod validate;

pub use buttons::{match_button, split_buttons};
pub use outbound::Outbox;
pub use runner::{FlowRunner, FlowState};
pub use validate::{FlowIssue, validate_flow};
