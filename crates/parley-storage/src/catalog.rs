// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot catalog served from preloaded definitions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parley_core::error::ParleyError;
use parley_core::flow::Flow;
use parley_core::rules::KeywordRule;
use parley_core::settings::{BotDefinition, ChatbotSettings};
use parley_core::traits::BotCatalog;

/// Serves bot definitions held in memory.
///
/// A tenant without its own definition gets the default one, if set.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    default: Option<Arc<BotDefinition>>,
    tenants: HashMap<String, Arc<BotDefinition>>,
}

impl StaticCatalog {
    /// A catalog serving `def` to every tenant.
    pub fn new(def: BotDefinition) -> Self {
        Self {
            default: Some(Arc::new(def)),
            tenants: HashMap::new(),
        }
    }

    /// A catalog with no default definition.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a tenant-specific definition.
    pub fn with_tenant(mut self, tenant_id: impl Into<String>, def: BotDefinition) -> Self {
        self.tenants.insert(tenant_id.into(), Arc::new(def));
        self
    }

    fn definition(&self, tenant_id: &str) -> Result<&BotDefinition, ParleyError> {
        self.tenants
            .get(tenant_id)
            .or(self.default.as_ref())
            .map(Arc::as_ref)
            .ok_or_else(|| ParleyError::not_found("tenant", tenant_id))
    }
}

#[async_trait]
impl BotCatalog for StaticCatalog {
    async fn settings(&self, tenant_id: &str) -> Result<ChatbotSettings, ParleyError> {
        Ok(self.definition(tenant_id)?.settings.clone())
    }

    async fn keyword_rules(&self, tenant_id: &str) -> Result<Vec<KeywordRule>, ParleyError> {
        Ok(self
            .definition(tenant_id)?
            .rules
            .iter()
            .filter(|r| r.enabled)
            .cloned()
            .collect())
    }

    async fn flows(&self, tenant_id: &str) -> Result<Vec<Flow>, ParleyError> {
        Ok(self
            .definition(tenant_id)?
            .flows
            .iter()
            .filter(|f| f.enabled)
            .cloned()
            .collect())
    }

    async fn flow(&self, tenant_id: &str, flow_id: &str) -> Result<Option<Flow>, ParleyError> {
        Ok(self.definition(tenant_id)?.flow(flow_id).cloned())
    }
}
