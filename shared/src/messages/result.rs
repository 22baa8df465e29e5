//! Scored variants and the optimization result

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::OptimizationMode;

/// Score a prompt is assumed to have before optimization
pub const BASELINE_SCORE: f64 = 0.5;

/// Stand-in for `sampleResponse` on speed-mode variants, which never see a model
pub const SPEED_MODE_PLACEHOLDER: &str =
    "[speed mode] No model response was generated for this variant; it was scored with prompt-only heuristics.";

/// The five sub-scores behind a composite score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub clarity: f64,
    pub specificity: f64,
    pub context: f64,
    pub structure: f64,
    pub efficiency: f64,
    pub strategy_bonus: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetrics {
    pub tokens_used: u32,
    pub response_length: usize,
    pub prompt_length: usize,
    pub strategy_weight_pct: f64,
    pub breakdown: ScoreBreakdown,
}

/// One scored candidate rewrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub strategy_name: String,
    /// Position in generation order; lower wins score ties
    pub generation_index: usize,
    pub prompt_text: String,
    pub sample_response: String,
    pub score: f64,
    pub metrics: VariantMetrics,
}

/// Whether the result reached durable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Unsynced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub improvement_score: f64,
    pub best_strategy_name: String,
    pub variant_count: usize,
    pub processing_time_ms: u64,
    /// Strategies attempted but dropped (deep mode only)
    #[serde(default)]
    pub skipped_strategies: Vec<String>,
}

/// Outcome of one successful optimization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub request_id: Uuid,
    pub original_prompt: String,
    pub mode: OptimizationMode,
    pub best_variant: Variant,
    /// Ordered by score descending, generation order on ties
    pub all_variants: Vec<Variant>,
    pub summary: OptimizationSummary,
    /// Rating handle for speed-mode runs
    pub speed_record_id: Option<Uuid>,
    pub sync_status: SyncStatus,
}

impl OptimizationResult {
    pub fn best_score(&self) -> f64 {
        self.best_variant.score
    }
}

/// Caller-facing rendering of a result
///
/// `bestOptimizedPrompt` and `optimizedPrompt` carry the same text so older
/// callers keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub original_prompt: String,
    pub mode: OptimizationMode,
    pub best_optimized_prompt: String,
    pub optimized_prompt: String,
    pub best_variant: Variant,
    pub variants: Vec<Variant>,
    pub summary: OptimizationSummary,
    pub speed_record_id: Option<Uuid>,
    pub sync_status: SyncStatus,
}

impl From<&OptimizationResult> for OptimizationResponse {
    fn from(result: &OptimizationResult) -> Self {
        Self {
            success: true,
            request_id: result.request_id,
            original_prompt: result.original_prompt.clone(),
            mode: result.mode,
            best_optimized_prompt: result.best_variant.prompt_text.clone(),
            optimized_prompt: result.best_variant.prompt_text.clone(),
            best_variant: result.best_variant.clone(),
            variants: result.all_variants.clone(),
            summary: result.summary.clone(),
            speed_record_id: result.speed_record_id,
            sync_status: result.sync_status,
        }
    }
}

/// Caller-facing failure; keeps the submitted prompt so the UI can retry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub reason: String,
    pub original_prompt: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, reason: impl Into<String>, original_prompt: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            reason: reason.into(),
            original_prompt,
        }
    }
}
