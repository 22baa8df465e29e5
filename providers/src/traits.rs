//! Provider trait definitions for dependency injection

use std::collections::HashMap;

use async_trait::async_trait;
use shared::{ApiFailure, ProviderId};

use crate::types::{InvocationRequest, ProviderResponse};

/// One backend behind the uniform invoke contract
///
/// New providers are added by implementing this trait and registering the
/// adapter, never by branching on the provider id.
#[mockall::automock]
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Backend this adapter talks to
    fn provider_id(&self) -> ProviderId;

    /// Send one prompt and return the normalized response
    ///
    /// Must not retry. A missing credential fails with `Unavailable` before
    /// any network traffic.
    async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure>;
}

/// API key source abstraction
#[mockall::automock]
#[async_trait]
pub trait ApiKeySource: Send + Sync {
    /// Collect whatever credentials are available, keyed by provider
    async fn get_api_keys(&self) -> HashMap<ProviderId, String>;
}
