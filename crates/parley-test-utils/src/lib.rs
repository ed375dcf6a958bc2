// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic
//! tests without external services.
//!
//! # Components
//!
//! - [`MockSender`] - captures outbound messages
//! - [`MockFetcher`] - scripted API fetch responses
//! - [`MockAiResponder`] - scripted AI answers
//! - [`MockHandoff`] / [`MockWebhook`] - record handoffs and completion webhooks
//! - [`DelayedSessionStore`] - widens the session lookup/create window
//! - [`TestHarness`] - a dispatcher wired to all of the above

pub mod harness;
pub mod mocks;
pub mod store;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mocks::{MockAiResponder, MockFetcher, MockHandoff, MockSender, MockWebhook, SentMessage};
pub use store::DelayedSessionStore;
