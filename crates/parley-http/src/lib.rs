// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapters for the Parley conversation engine.
//!
//! [`HttpFetcher`] performs `api_fetch` step requests and maps their JSON
//! responses into session data. [`HttpWebhookDispatcher`] posts the
//! completion webhook of a flow. Both render their URL, header and body
//! templates against session data and apply the configured request timeout.
//! Neither retries.

pub mod client;
pub mod extract;
pub mod fetcher;
pub mod webhook;

pub use extract::extract_response;
pub use fetcher::HttpFetcher;
pub use webhook::HttpWebhookDispatcher;
