//! Deep mode: live rewrite and test calls per strategy
//!
//! Strategy slots run concurrently on a `JoinSet`, bounded by a semaphore.
//! Each slot makes two sequential provider calls. A slot whose calls fail is
//! skipped; the others carry on. Dropping the generation future drops the
//! `JoinSet`, which aborts whatever is still in flight.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use providers::{ProviderRegistry, ProviderResponse};
use shared::{process_debug, process_error, process_warn, ApiFailure, OptimizationRequest, ProcessId};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::strategies::{self, templates, StrategySlot};
use super::Candidate;
use crate::config::OptimizerConfig;

/// Which of the two per-strategy calls failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    Rewrite,
    Test,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStage::Rewrite => f.write_str("rewrite"),
            CallStage::Test => f.write_str("test"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyFailure {
    pub index: usize,
    pub strategy_name: String,
    pub stage: CallStage,
    pub failure: ApiFailure,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (#{}) {} call: {}",
            self.strategy_name, self.index, self.stage, self.failure
        )
    }
}

/// Everything a deep run produced, successes in generation order
#[derive(Debug, Default)]
pub struct DeepOutcome {
    pub candidates: Vec<Candidate>,
    pub failures: Vec<StrategyFailure>,
    pub attempted: usize,
}

#[derive(Debug, Clone, Copy)]
struct CallPolicy {
    timeout: Duration,
    retry: bool,
}

impl CallPolicy {
    fn attempts(&self) -> usize {
        if self.retry {
            2
        } else {
            1
        }
    }
}

pub struct DeepGenerator {
    registry: Arc<ProviderRegistry>,
    policy: CallPolicy,
    max_workers: usize,
}

impl DeepGenerator {
    pub fn new(registry: Arc<ProviderRegistry>, config: &OptimizerConfig) -> Self {
        Self {
            registry,
            policy: CallPolicy {
                timeout: config.call_timeout,
                retry: config.retry_failed_calls,
            },
            max_workers: config.max_workers.max(1),
        }
    }

    /// Attempt every planned slot; never stops early on failures
    pub async fn generate(&self, request: &OptimizationRequest) -> DeepOutcome {
        let slots = strategies::plan(usize::from(request.variant_count));
        let attempted = slots.len();
        let permits = Arc::new(Semaphore::new(self.max_workers.min(attempted).max(1)));
        let request = Arc::new(request.clone());

        let mut tasks = JoinSet::new();
        for slot in slots {
            let registry = Arc::clone(&self.registry);
            let request = Arc::clone(&request);
            let permits = Arc::clone(&permits);
            let policy = self.policy;

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = permits.acquire_owned().await.ok();
                run_slot(&registry, &request, slot, policy).await
            });
        }

        let mut outcome = DeepOutcome {
            attempted,
            ..DeepOutcome::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(candidate)) => outcome.candidates.push(candidate),
                Ok(Err(failure)) => {
                    process_warn!(
                        ProcessId::current(),
                        "⚠️ Skipping strategy {} (#{}): {} call failed: {}",
                        failure.strategy_name,
                        failure.index,
                        failure.stage,
                        failure.failure
                    );
                    outcome.failures.push(failure);
                }
                Err(join_error) => {
                    process_error!(ProcessId::current(), "❌ Strategy task aborted: {}", join_error);
                }
            }
        }

        outcome.candidates.sort_by_key(|candidate| candidate.slot.index);
        outcome.failures.sort_by_key(|failure| failure.index);
        outcome
    }
}

async fn run_slot(
    registry: &ProviderRegistry,
    request: &OptimizationRequest,
    slot: StrategySlot,
    policy: CallPolicy,
) -> Result<Candidate, StrategyFailure> {
    let fail = |stage: CallStage, failure: ApiFailure| StrategyFailure {
        index: slot.index,
        strategy_name: slot.strategy.name.to_string(),
        stage,
        failure,
    };

    let instruction = templates::rewrite_instruction(&slot, request);
    let rewrite = call_provider(registry, request, &instruction, policy)
        .await
        .map_err(|failure| fail(CallStage::Rewrite, failure))?;

    let rewritten = templates::clean_rewrite(&rewrite.content);
    if rewritten.is_empty() {
        return Err(fail(
            CallStage::Rewrite,
            ApiFailure::Unavailable("provider returned an empty rewrite".to_string()),
        ));
    }

    let test_prompt = templates::test_prompt(&rewritten, request.task_context());
    let sample = call_provider(registry, request, &test_prompt, policy)
        .await
        .map_err(|failure| fail(CallStage::Test, failure))?;

    process_debug!(
        ProcessId::current(),
        "✅ Strategy {} (#{}) produced a {}-char rewrite",
        slot.strategy.name,
        slot.index,
        rewritten.chars().count()
    );

    Ok(Candidate {
        slot,
        prompt_text: rewritten,
        sample_response: Some(sample.content),
        tokens_used: rewrite.tokens_used.saturating_add(sample.tokens_used),
    })
}

/// One provider call under the deadline, retried once when the policy allows
async fn call_provider(
    registry: &ProviderRegistry,
    request: &OptimizationRequest,
    prompt: &str,
    policy: CallPolicy,
) -> Result<ProviderResponse, ApiFailure> {
    let attempts = policy.attempts();
    let mut last_failure = ApiFailure::Timeout;

    for attempt in 1..=attempts {
        let call = registry.invoke(
            request.provider,
            &request.model,
            prompt,
            request.max_tokens,
            request.temperature,
        );

        last_failure = match tokio::time::timeout(policy.timeout, call).await {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(failure)) => failure,
            Err(_) => ApiFailure::Timeout,
        };

        // InvalidModel is permanent
        if matches!(last_failure, ApiFailure::InvalidModel(_)) {
            break;
        }
        if attempt < attempts {
            process_debug!(
                ProcessId::current(),
                "🔁 Retrying {} call after: {}",
                request.provider,
                last_failure
            );
        }
    }

    Err(last_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use providers::{InvocationRequest, MockProviderAdapter, ProviderAdapter, RandomAdapter};
    use shared::{OutputType, ProviderId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every call, but hangs on the rewrite call for one strategy
    struct HangingAdapter {
        hang_on: &'static str,
    }

    #[async_trait]
    impl ProviderAdapter for HangingAdapter {
        fn provider_id(&self) -> ProviderId {
            ProviderId::OpenAI
        }

        async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure> {
            if request.prompt.contains(self.hang_on) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(ProviderResponse::from_text(
                "Sort the list in ascending order and explain the chosen algorithm.",
                &request.model,
                Duration::from_millis(1),
            ))
        }
    }

    fn config() -> OptimizerConfig {
        OptimizerConfig::default().with_call_timeout(Duration::from_millis(100))
    }

    fn request(provider: ProviderId, model: &str, count: u8) -> OptimizationRequest {
        OptimizationRequest::new("Write code to sort a list", provider, model, OutputType::Code)
            .with_variant_count(count)
    }

    #[tokio::test]
    async fn test_healthy_provider_returns_every_slot() {
        let registry = Arc::new(ProviderRegistry::new().with_adapter(Arc::new(RandomAdapter::new())));
        let generator = DeepGenerator::new(registry, &config());

        let outcome = generator.generate(&request(ProviderId::Random, "random", 7)).await;

        assert_eq!(outcome.attempted, 7);
        assert_eq!(outcome.candidates.len(), 7);
        assert!(outcome.failures.is_empty());
        let indices: Vec<usize> = outcome.candidates.iter().map(|c| c.slot.index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
        assert!(outcome.candidates.iter().all(|c| c.sample_response.is_some()));
    }

    #[tokio::test]
    async fn test_timed_out_strategy_is_skipped() {
        let adapter = HangingAdapter {
            hang_on: "with a clear structure",
        };
        let registry = Arc::new(ProviderRegistry::new().with_adapter(Arc::new(adapter)));
        let generator = DeepGenerator::new(registry, &config());

        let outcome = generator.generate(&request(ProviderId::OpenAI, "gpt-4o-mini", 3)).await;

        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert_eq!(failure.strategy_name, "structure");
        assert_eq!(failure.stage, CallStage::Rewrite);
        assert_eq!(failure.failure, ApiFailure::Timeout);
    }

    #[tokio::test]
    async fn test_all_failures_reported() {
        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::Gemini);
        adapter
            .expect_invoke()
            .returning(|_| Err(ApiFailure::Unavailable("down".to_string())));
        let registry = Arc::new(ProviderRegistry::new().with_adapter(Arc::new(adapter)));
        let generator = DeepGenerator::new(registry, &config());

        let outcome = generator
            .generate(&request(ProviderId::Gemini, "gemini-1.5-flash", 4))
            .await;

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.failures.len(), 4);
    }

    #[tokio::test]
    async fn test_single_retry_recovers_transient_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::Anthropic);
        adapter.expect_invoke().returning(move |request| {
            // First call of the run is rate limited, everything after succeeds
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ApiFailure::RateLimited)
            } else {
                Ok(ProviderResponse::from_text("A rewritten prompt.", &request.model, Duration::ZERO))
            }
        });
        let registry = Arc::new(ProviderRegistry::new().with_adapter(Arc::new(adapter)));
        let generator = DeepGenerator::new(registry, &config());

        let outcome = generator
            .generate(&request(ProviderId::Anthropic, "claude-3-5-haiku-latest", 1))
            .await;

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_without_retry_first_failure_skips() {
        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::Anthropic);
        adapter
            .expect_invoke()
            .times(1)
            .returning(|_| Err(ApiFailure::RateLimited));
        let registry = Arc::new(ProviderRegistry::new().with_adapter(Arc::new(adapter)));
        let generator = DeepGenerator::new(registry, &config().with_retry(false));

        let outcome = generator
            .generate(&request(ProviderId::Anthropic, "claude-3-5-haiku-latest", 1))
            .await;

        assert!(outcome.candidates.is_empty());
        assert_eq!(outcome.failures[0].failure, ApiFailure::RateLimited);
    }

    #[tokio::test]
    async fn test_failed_test_call_skips_strategy() {
        let test_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&test_calls);

        let mut adapter = MockProviderAdapter::new();
        adapter.expect_provider_id().return_const(ProviderId::OpenAI);
        adapter.expect_invoke().returning(move |request| {
            let rewrite = if request.prompt.contains("with a clear structure") {
                "1. Sort the list. 2. Explain the algorithm."
            } else {
                "Sort the list in ascending order."
            };
            if request.prompt.contains("Respond to the prompt above") {
                if request.prompt.starts_with("1. Sort the list.") {
                    counter.fetch_add(1, Ordering::SeqCst);
                    return Err(ApiFailure::Unavailable("bad gateway".to_string()));
                }
                return Ok(ProviderResponse::from_text("Here is the sorted list.", &request.model, Duration::ZERO));
            }
            Ok(ProviderResponse::from_text(rewrite, &request.model, Duration::ZERO))
        });
        let registry = Arc::new(ProviderRegistry::new().with_adapter(Arc::new(adapter)));
        let generator = DeepGenerator::new(registry, &config());

        let outcome = generator.generate(&request(ProviderId::OpenAI, "gpt-4o-mini", 3)).await;

        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.failures.len(), 1);
        let failure = &outcome.failures[0];
        assert_eq!(failure.strategy_name, "structure");
        assert_eq!(failure.stage, CallStage::Test);
        assert_eq!(failure.failure, ApiFailure::Unavailable("bad gateway".to_string()));
        // The test call was retried once before the strategy was dropped
        assert_eq!(test_calls.load(Ordering::SeqCst), 2);

        let survivors: Vec<&str> = outcome.candidates.iter().map(|c| c.slot.strategy.name).collect();
        assert_eq!(survivors.len(), 2);
        assert!(!survivors.contains(&"structure"));
        assert!(outcome.candidates.iter().all(|c| c.sample_response.is_some()));
    }
}
