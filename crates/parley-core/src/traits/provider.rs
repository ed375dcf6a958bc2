// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI fallback responder.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::settings::AiSettings;
use crate::types::ChatTurn;

/// Produces a free-form answer when no rule or flow handled a message.
///
/// Implementations own the provider wire protocol; the engine only hands over
/// the tenant's AI settings and recent history, oldest first.
#[async_trait]
pub trait AiResponder: Send + Sync {
    async fn generate(
        &self,
        settings: &AiSettings,
        history: &[ChatTurn],
        user_message: &str,
    ) -> Result<String, ParleyError>;
}
