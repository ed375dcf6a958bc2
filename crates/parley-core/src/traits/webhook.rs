// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flow completion webhooks.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::flow::Flow;
use crate::session::Session;
use crate::types::ContactKey;

/// Fires a flow's `on_complete` webhook.
///
/// Called once per completed flow, from a spawned task. Failures are logged by
/// the engine and never retried.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        flow: &Flow,
        session: &Session,
        contact: &ContactKey,
    ) -> Result<(), ParleyError>;
}
