// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human agent handoff.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::HandoffRequest;

/// Queues a conversation for a human agent.
#[async_trait]
pub trait HandoffService: Send + Sync {
    /// Creates a transfer in the team queue named by the request, or the
    /// general queue when it names none.
    async fn create_handoff(&self, request: HandoffRequest) -> Result<(), ParleyError>;
}
