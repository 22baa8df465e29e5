//! Provider registry: validation, clamping and dispatch

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use shared::{process_debug, ApiFailure, ProcessId, ProviderId};

use crate::services::{AnthropicAdapter, GeminiAdapter, OpenAiAdapter, RandomAdapter};
use crate::traits::ProviderAdapter;
use crate::types::{InvocationRequest, ProviderResponse};

/// Holds one adapter per provider and fronts them with a single `invoke`
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every known backend; backends without a key still register
    /// and fail fast with `Unavailable` when invoked
    pub fn from_api_keys(api_keys: &HashMap<ProviderId, String>, timeout: Duration) -> Self {
        let key = |provider: ProviderId| api_keys.get(&provider).cloned();

        Self::new()
            .with_adapter(Arc::new(OpenAiAdapter::new(key(ProviderId::OpenAI), timeout)))
            .with_adapter(Arc::new(AnthropicAdapter::new(key(ProviderId::Anthropic), timeout)))
            .with_adapter(Arc::new(GeminiAdapter::new(key(ProviderId::Gemini), timeout)))
            .with_adapter(Arc::new(RandomAdapter::new()))
    }

    /// Add or replace the adapter for its provider
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider_id(), adapter);
    }

    pub fn has_provider(&self, provider: ProviderId) -> bool {
        self.adapters.contains_key(&provider)
    }

    /// Registered providers in a stable order
    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|provider| self.adapters.contains_key(provider))
            .collect()
    }

    /// Call `model` under `provider` with the given prompt and sampling
    ///
    /// Unknown providers and models fail immediately. `max_tokens` and
    /// `temperature` are clamped to the provider's accepted range first.
    pub async fn invoke(
        &self,
        provider: ProviderId,
        model: &str,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderResponse, ApiFailure> {
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| ApiFailure::Unavailable(format!("no adapter registered for {provider}")))?;

        if !provider.supports_model(model) {
            return Err(ApiFailure::InvalidModel(format!("{model} is not offered by {provider}")));
        }

        let (max_tokens, temperature) = provider.limits().clamp(max_tokens, temperature);
        process_debug!(
            ProcessId::current(),
            "📤 Invoking {}:{} (max_tokens={}, temperature={:.2})",
            provider,
            model,
            max_tokens,
            temperature
        );

        adapter
            .invoke(InvocationRequest {
                model: model.to_string(),
                prompt: prompt.to_string(),
                max_tokens,
                temperature,
            })
            .await
    }
}
