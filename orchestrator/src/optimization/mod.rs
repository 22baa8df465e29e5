//! Variant generation, scoring and selection
//!
//! Both generators emit unscored `Candidate`s; scoring and ranking happen in
//! one place so deep and speed runs are judged by the same scorer.

pub mod deep;
pub mod scorer;
pub mod selector;
pub mod speed;
pub mod strategies;

use shared::{Variant, VariantMetrics, SPEED_MODE_PLACEHOLDER};

use scorer::EfficiencyBasis;
use strategies::StrategySlot;

pub use deep::{CallStage, DeepGenerator, DeepOutcome, StrategyFailure};
pub use selector::{rank, select_best};
pub use strategies::{catalog, Strategy};

/// A rewritten prompt waiting to be scored
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub slot: StrategySlot,
    pub prompt_text: String,
    /// Live model output; `None` for speed-mode candidates
    pub sample_response: Option<String>,
    pub tokens_used: u32,
}

impl Candidate {
    /// Score against the live response when there is one, otherwise against the original prompt
    pub fn into_variant(self, original_prompt: &str) -> Variant {
        let weight = self.slot.strategy.weight;
        let basis = match &self.sample_response {
            Some(response) => EfficiencyBasis::Response(response),
            None => EfficiencyBasis::Original(original_prompt),
        };
        let breakdown = scorer::score(&self.prompt_text, basis, weight);

        let response_length = self
            .sample_response
            .as_deref()
            .map_or(0, |response| response.chars().count());

        Variant {
            strategy_name: self.slot.strategy.name.to_string(),
            generation_index: self.slot.index,
            score: breakdown.total,
            metrics: VariantMetrics {
                tokens_used: self.tokens_used,
                response_length,
                prompt_length: self.prompt_text.chars().count(),
                strategy_weight_pct: weight * 100.0,
                breakdown,
            },
            sample_response: self
                .sample_response
                .unwrap_or_else(|| SPEED_MODE_PLACEHOLDER.to_string()),
            prompt_text: self.prompt_text,
        }
    }
}

/// Score every candidate, keeping generation order
pub fn score_candidates(candidates: Vec<Candidate>, original_prompt: &str) -> Vec<Variant> {
    candidates
        .into_iter()
        .map(|candidate| candidate.into_variant(original_prompt))
        .collect()
}
