// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External API access for `api_fetch` steps.

use async_trait::async_trait;

use crate::data::SessionData;
use crate::error::ParleyError;
use crate::flow::ApiFetchConfig;
use crate::types::ApiResponse;

/// Calls an external API on behalf of a flow step.
#[async_trait]
pub trait ExternalFetcher: Send + Sync {
    /// Performs the request described by `config`.
    ///
    /// Templates in the config are rendered against `data`. `message_template`
    /// is the step's own message, available to fetchers that build the reply
    /// themselves.
    async fn fetch(
        &self,
        config: &ApiFetchConfig,
        data: &SessionData,
        message_template: &str,
    ) -> Result<ApiResponse, ParleyError>;
}
