//! Main orchestrator implementation
//!
//! Dispatches a request to the deep or speed generator, scores and ranks the
//! candidates, selects the best, persists the run as a final step and ingests
//! ratings into the per-user insight cache.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use providers::ProviderRegistry;
use shared::{
    process_error, process_info, process_warn, OptimizationMode, OptimizationRequest, OptimizationResult,
    OptimizationSummary, ProcessId, RatingOutcome, RatingRequest, SyncStatus, BASELINE_SCORE, MAX_STARS,
    MIN_STARS,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::OptimizerConfig;
use crate::core::{InsightCache, OptimizationPhase, RunTracker};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::optimization::{rank, score_candidates, speed, Candidate, DeepGenerator};
use crate::records::{PersistedOptimization, PromptRecord};
use crate::traits::PromptStore;

/// Generation output before scoring
struct Generated {
    candidates: Vec<Candidate>,
    attempted: usize,
    failures: Vec<String>,
    skipped: Vec<String>,
}

/// Main orchestrator over a provider registry and a prompt store
pub struct Orchestrator<S>
where
    S: PromptStore + 'static,
{
    registry: Arc<ProviderRegistry>,
    store: Arc<S>,
    insights: Arc<InsightCache>,
    config: OptimizerConfig,

    /// Completed runs whose durable write failed, oldest first, capped at
    /// `config.max_unsynced`
    unsynced: Mutex<VecDeque<PersistedOptimization>>,

    /// Serialises rating check-and-set
    rating_lock: Mutex<()>,
}

impl<S> Orchestrator<S>
where
    S: PromptStore + 'static,
{
    pub fn new(registry: ProviderRegistry, store: S, config: OptimizerConfig) -> Self {
        let insights = Arc::new(InsightCache::new(config.max_patterns_per_strategy));
        Self::with_shared(Arc::new(registry), Arc::new(store), insights, config)
    }

    /// Build over components the caller also holds on to
    pub fn with_shared(
        registry: Arc<ProviderRegistry>,
        store: Arc<S>,
        insights: Arc<InsightCache>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            registry,
            store,
            insights,
            config,
            unsynced: Mutex::new(VecDeque::new()),
            rating_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn insights(&self) -> &InsightCache {
        &self.insights
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one optimization to completion
    pub async fn optimize(&self, user_id: &str, request: OptimizationRequest) -> OrchestratorResult<OptimizationResult> {
        self.optimize_until(user_id, request, std::future::pending::<()>()).await
    }

    /// Run one optimization, abandoning it if `cancel` resolves first
    ///
    /// Cancellation drops in-flight provider calls and persists nothing.
    pub async fn optimize_until<F>(
        &self,
        user_id: &str,
        request: OptimizationRequest,
        cancel: F,
    ) -> OrchestratorResult<OptimizationResult>
    where
        F: Future<Output = ()> + Send,
    {
        if let Err(e) = request.validate() {
            return Err(OrchestratorError::invalid_request(
                e.to_string(),
                request.original_prompt.clone(),
            ));
        }

        let mut run = RunTracker::new(Uuid::new_v4());
        process_info!(
            ProcessId::current(),
            "🎯 Optimization {} started: mode={}, provider={}, model={}, variants={}",
            run.request_id(),
            request.mode,
            request.provider,
            request.model,
            request.variant_count
        );

        run.advance(OptimizationPhase::GeneratingVariants)?;
        let generated = match request.mode {
            OptimizationMode::Speed => Generated {
                candidates: speed::generate(&request, user_id, &self.insights),
                attempted: usize::from(request.variant_count),
                failures: Vec::new(),
                skipped: Vec::new(),
            },
            OptimizationMode::Deep => {
                let generator = DeepGenerator::new(Arc::clone(&self.registry), &self.config);
                let outcome = tokio::select! {
                    biased;
                    _ = cancel => {
                        process_warn!(ProcessId::current(), "🛑 Optimization {} cancelled during generation", run.request_id());
                        return Err(OrchestratorError::Cancelled {
                            original_prompt: request.original_prompt.clone(),
                        });
                    }
                    outcome = generator.generate(&request) => outcome,
                };
                Generated {
                    attempted: outcome.attempted,
                    failures: outcome.failures.iter().map(ToString::to_string).collect(),
                    skipped: outcome
                        .failures
                        .iter()
                        .map(|failure| failure.strategy_name.clone())
                        .collect(),
                    candidates: outcome.candidates,
                }
            }
        };

        if generated.candidates.is_empty() {
            run.advance(OptimizationPhase::Failed)?;
            process_error!(
                ProcessId::current(),
                "❌ Optimization {} produced no variants ({} attempted)",
                run.request_id(),
                generated.attempted
            );
            return Err(OrchestratorError::NoVariantsGenerated {
                attempted: generated.attempted,
                failures: generated.failures,
                original_prompt: request.original_prompt.clone(),
            });
        }

        run.advance(OptimizationPhase::Scoring)?;
        let variants = rank(score_candidates(generated.candidates, &request.original_prompt));

        run.advance(OptimizationPhase::Selecting)?;
        let best_variant = variants
            .first()
            .cloned()
            .ok_or_else(|| OrchestratorError::NoVariantsGenerated {
                attempted: generated.attempted,
                failures: Vec::new(),
                original_prompt: request.original_prompt.clone(),
            })?;

        let mut result = OptimizationResult {
            request_id: run.request_id(),
            original_prompt: request.original_prompt.clone(),
            mode: request.mode,
            summary: OptimizationSummary {
                improvement_score: best_variant.score - BASELINE_SCORE,
                best_strategy_name: best_variant.strategy_name.clone(),
                variant_count: variants.len(),
                processing_time_ms: run.elapsed_ms(),
                skipped_strategies: generated.skipped,
            },
            best_variant,
            all_variants: variants,
            speed_record_id: (request.mode == OptimizationMode::Speed).then(Uuid::new_v4),
            sync_status: SyncStatus::Synced,
        };

        run.advance(OptimizationPhase::Persisting)?;
        let record = PersistedOptimization::from_result(user_id, &request, &result, Utc::now());
        if let Err(e) = self.store.save_optimization(&record).await {
            process_error!(
                ProcessId::current(),
                "❌ Persisting optimization {} failed, queued for retry: {}",
                run.request_id(),
                e
            );
            self.queue_unsynced(record).await;
            result.sync_status = SyncStatus::Unsynced;
        }

        run.advance(OptimizationPhase::Completed)?;
        process_info!(
            ProcessId::current(),
            "✅ Optimization {} completed: best={} ({:.3}), {} variants, {}ms",
            run.request_id(),
            result.summary.best_strategy_name,
            result.best_score(),
            result.summary.variant_count,
            result.summary.processing_time_ms
        );
        Ok(result)
    }

    /// Rate a speed-mode result; at most one rating per record
    pub async fn submit_rating(&self, user_id: &str, rating: RatingRequest) -> OrchestratorResult<RatingOutcome> {
        if !rating.stars_in_range() {
            return Err(OrchestratorError::InvalidRequest {
                reason: format!(
                    "stars must be between {MIN_STARS} and {MAX_STARS}, got {}",
                    rating.stars
                ),
                original_prompt: None,
            });
        }

        let _guard = self.rating_lock.lock().await;

        let record = self
            .store
            .find_speed_record(rating.record_id)
            .await?
            .ok_or(OrchestratorError::RecordNotFound {
                record_id: rating.record_id,
            })?;

        if record.user_id != user_id {
            return Err(OrchestratorError::RatingRejected {
                record_id: rating.record_id,
                reason: "record belongs to another user".to_string(),
            });
        }

        if record.rating.is_some()
            || !self
                .store
                .set_speed_rating(rating.record_id, rating.stars, Utc::now())
                .await?
        {
            process_info!(
                ProcessId::current(),
                "⭐ Record {} already rated, ignoring new rating",
                rating.record_id
            );
            return Ok(RatingOutcome::AlreadyRated);
        }

        self.insights.record_feedback(
            user_id,
            &record.best_strategy,
            rating.stars,
            &record.optimized_prompt,
            &record.original_prompt,
        );
        process_info!(
            ProcessId::current(),
            "⭐ Record {} rated {} stars by {}",
            rating.record_id,
            rating.stars,
            user_id
        );
        Ok(RatingOutcome::Applied)
    }

    /// Queue a failed write, evicting the oldest entry when the queue is full
    async fn queue_unsynced(&self, record: PersistedOptimization) {
        let mut queue = self.unsynced.lock().await;
        while queue.len() >= self.config.max_unsynced.max(1) {
            let Some(dropped) = queue.pop_front() else {
                break;
            };
            process_error!(
                ProcessId::current(),
                "❌ Unsynced queue full ({}), dropping optimization {} for user {}",
                self.config.max_unsynced,
                dropped.prompt.id,
                dropped.prompt.user_id
            );
        }
        queue.push_back(record);
    }

    /// Replay queued writes; returns how many reached the store
    pub async fn retry_unsynced(&self) -> usize {
        let mut queue = self.unsynced.lock().await;
        let mut remaining = VecDeque::with_capacity(queue.len());
        let mut synced = 0;

        while let Some(record) = queue.pop_front() {
            match self.store.save_optimization(&record).await {
                Ok(()) => synced += 1,
                Err(e) => {
                    process_warn!(
                        ProcessId::current(),
                        "Retry of optimization {} failed: {}",
                        record.prompt.id,
                        e
                    );
                    remaining.push_back(record);
                }
            }
        }

        *queue = remaining;
        synced
    }

    pub async fn unsynced_count(&self) -> usize {
        self.unsynced.lock().await.len()
    }

    /// A user's recent prompts, newest first
    pub async fn history(&self, user_id: &str, limit: usize) -> OrchestratorResult<Vec<PromptRecord>> {
        self.store.recent_prompts(user_id, limit).await
    }
}
