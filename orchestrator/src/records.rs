//! Durable record shapes written at the end of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    OptimizationMode, OptimizationRequest, OptimizationResult, OutputType, ProviderId, VariantMetrics,
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Completed,
}

/// One row per optimization request (`prompts`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: Uuid,
    pub user_id: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub task_description: Option<String>,
    pub provider: ProviderId,
    pub model: String,
    pub output_type: OutputType,
    pub mode: OptimizationMode,
    pub status: RecordStatus,
    pub best_score: f64,
    pub best_strategy: String,
    pub performance_metrics: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One row per scored variant (`optimization_history`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub prompt_id: Uuid,
    pub user_id: String,
    pub strategy_name: String,
    pub generation_index: usize,
    /// 1-based position in the ranked list
    pub rank: usize,
    pub prompt_text: String,
    pub sample_response: String,
    pub score: f64,
    pub metrics: VariantMetrics,
    pub created_at: DateTime<Utc>,
}

/// One row per speed-mode run (`speed_optimizations`), rateable once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedOptimizationRecord {
    pub id: Uuid,
    pub prompt_id: Uuid,
    pub user_id: String,
    pub original_prompt: String,
    pub optimized_prompt: String,
    pub best_strategy: String,
    pub best_score: f64,
    pub rating: Option<u8>,
    pub rated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Everything one run writes, applied as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedOptimization {
    pub prompt: PromptRecord,
    pub history: Vec<HistoryRecord>,
    pub speed: Option<SpeedOptimizationRecord>,
}

impl PersistedOptimization {
    pub fn from_result(
        user_id: &str,
        request: &OptimizationRequest,
        result: &OptimizationResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        let best = &result.best_variant;

        let performance_metrics = serde_json::json!({
            "improvementScore": result.summary.improvement_score,
            "processingTimeMs": result.summary.processing_time_ms,
            "variantCount": result.summary.variant_count,
            "skippedStrategies": result.summary.skipped_strategies,
            "requestedVariants": request.variant_count,
            "bestBreakdown": best.metrics.breakdown,
            "totalTokensUsed": result
                .all_variants
                .iter()
                .map(|variant| u64::from(variant.metrics.tokens_used))
                .sum::<u64>(),
        });

        let prompt = PromptRecord {
            id: result.request_id,
            user_id: user_id.to_string(),
            original_prompt: result.original_prompt.clone(),
            optimized_prompt: best.prompt_text.clone(),
            task_description: request.task_context().map(str::to_string),
            provider: request.provider,
            model: request.model.clone(),
            output_type: request.output_type,
            mode: result.mode,
            status: RecordStatus::Completed,
            best_score: best.score,
            best_strategy: best.strategy_name.clone(),
            performance_metrics,
            created_at,
        };

        let history = result
            .all_variants
            .iter()
            .enumerate()
            .map(|(position, variant)| HistoryRecord {
                id: Uuid::new_v4(),
                prompt_id: result.request_id,
                user_id: user_id.to_string(),
                strategy_name: variant.strategy_name.clone(),
                generation_index: variant.generation_index,
                rank: position + 1,
                prompt_text: variant.prompt_text.clone(),
                sample_response: variant.sample_response.clone(),
                score: variant.score,
                metrics: variant.metrics.clone(),
                created_at,
            })
            .collect();

        let speed = result.speed_record_id.map(|id| SpeedOptimizationRecord {
            id,
            prompt_id: result.request_id,
            user_id: user_id.to_string(),
            original_prompt: result.original_prompt.clone(),
            optimized_prompt: best.prompt_text.clone(),
            best_strategy: best.strategy_name.clone(),
            best_score: best.score,
            rating: None,
            rated_at: None,
            created_at,
        });

        Self { prompt, history, speed }
    }
}
