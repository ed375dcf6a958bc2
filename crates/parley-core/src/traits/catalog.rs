// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot definition lookup.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::flow::Flow;
use crate::rules::KeywordRule;
use crate::settings::ChatbotSettings;

/// Serves settings, keyword rules and flows per tenant.
#[async_trait]
pub trait BotCatalog: Send + Sync {
    async fn settings(&self, tenant_id: &str) -> Result<ChatbotSettings, ParleyError>;

    /// Enabled rules, in configured order.
    async fn keyword_rules(&self, tenant_id: &str) -> Result<Vec<KeywordRule>, ParleyError>;

    /// Enabled flows, in configured order.
    async fn flows(&self, tenant_id: &str) -> Result<Vec<Flow>, ParleyError>;

    /// A single flow snapshot, enabled or not.
    async fn flow(&self, tenant_id: &str, flow_id: &str) -> Result<Option<Flow>, ParleyError>;
}
