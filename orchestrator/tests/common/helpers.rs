//! Builders and assertions shared by the integration suites

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use orchestrator::{MemoryStore, Orchestrator, OrchestratorError, OptimizerConfig};
use providers::{InvocationRequest, MockProviderAdapter, ProviderAdapter, ProviderRegistry, ProviderResponse};
use shared::{ApiFailure, ProviderId};

use super::fixtures::TestFixtures;

/// Answers rewrite calls with a rewritten prompt and test calls with a sample
pub fn answer(prompt: &str) -> ProviderResponse {
    let content = if prompt.contains(TestFixtures::REWRITE_MARKER) {
        TestFixtures::rewritten_prompt()
    } else {
        TestFixtures::sample_answer()
    };
    ProviderResponse::from_text(content, TestFixtures::OPENAI_MODEL, Duration::from_millis(1))
}

/// Adapter that never answers prompts containing `marker`
pub struct HangingAdapter {
    pub provider: ProviderId,
    pub marker: &'static str,
}

#[async_trait]
impl ProviderAdapter for HangingAdapter {
    fn provider_id(&self) -> ProviderId {
        self.provider
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure> {
        if request.prompt.contains(self.marker) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(answer(&request.prompt))
    }
}

/// Builder for orchestrators over a `MemoryStore`
pub struct OrchestratorBuilder {
    registry: ProviderRegistry,
    config: OptimizerConfig,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            registry: ProviderRegistry::new(),
            config: OptimizerConfig::default()
                .with_call_timeout(Duration::from_millis(200))
                .with_max_workers(4),
        }
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.registry.register(adapter);
        self
    }

    /// OpenAI mock that answers every call
    pub fn with_healthy_openai(self) -> Self {
        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::OpenAI);
        adapter
            .expect_invoke()
            .returning(|request| Ok(answer(&request.prompt)));
        self.with_adapter(Arc::new(adapter))
    }

    /// OpenAI mock that must never be called
    pub fn with_silent_openai(self) -> Self {
        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::OpenAI);
        adapter.expect_invoke().never();
        self.with_adapter(Arc::new(adapter))
    }

    /// OpenAI mock where every call fails
    pub fn with_failing_openai(self, failure: ApiFailure) -> Self {
        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::OpenAI);
        adapter
            .expect_invoke()
            .returning(move |_| Err(failure.clone()));
        self.with_adapter(Arc::new(adapter))
    }

    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Orchestrator<MemoryStore> {
        Orchestrator::new(self.registry, MemoryStore::new(), self.config)
    }
}

pub struct TestHelpers;

impl TestHelpers {
    /// Assert the error keeps the submitted prompt for the caller
    pub fn assert_keeps_prompt(error: &OrchestratorError, prompt: &str) {
        assert_eq!(error.original_prompt(), Some(prompt), "error should carry the original prompt: {error}");
    }

    /// Assert variants are ordered by score, generation order on ties
    pub fn assert_ranked(variants: &[shared::Variant]) {
        for pair in variants.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.score > b.score || (a.score == b.score && a.generation_index < b.generation_index),
                "variants out of order: {} ({}) before {} ({})",
                a.strategy_name,
                a.score,
                b.strategy_name,
                b.score
            );
        }
    }
}
