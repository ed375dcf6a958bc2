// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword routing for the Parley conversation engine.
//!
//! This crate provides:
//! - [`matches_keyword`]: one keyword against one message, per match type
//! - [`match_rules`]: first usable keyword rule in priority order
//! - [`match_flow_trigger`] / [`contains_cancel_keyword`]: flow entry and exit
//!
//! The router only reports matches. Deciding what a match does (reply,
//! transfer, start a flow) is left to the dispatcher.

pub mod keyword;
pub mod trigger;

pub use keyword::{match_rules, matches_keyword};
pub use trigger::{contains_cancel_keyword, match_flow_trigger};
