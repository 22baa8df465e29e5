//! Inbound optimization request

use serde::{Deserialize, Serialize};

use crate::errors::{SharedError, SharedResult};
use crate::types::{OptimizationMode, OutputType, ProviderId};

pub const MIN_VARIANTS: u8 = 1;
pub const MAX_VARIANTS: u8 = 10;
pub const MAX_INFLUENCE_WEIGHT: u8 = 100;

fn default_variant_count() -> u8 {
    3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

/// One optimization call as submitted by the caller
///
/// Only `originalPrompt`, `provider`, `model` and `outputType` are required
/// on the wire; everything else falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    pub original_prompt: String,
    #[serde(default)]
    pub task_description: Option<String>,
    pub provider: ProviderId,
    pub model: String,
    pub output_type: OutputType,
    #[serde(default = "default_variant_count")]
    pub variant_count: u8,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub influence_text: Option<String>,
    #[serde(default)]
    pub influence_weight: u8,
    #[serde(default)]
    pub mode: OptimizationMode,
}

impl OptimizationRequest {
    pub fn new(
        original_prompt: impl Into<String>,
        provider: ProviderId,
        model: impl Into<String>,
        output_type: OutputType,
    ) -> Self {
        Self {
            original_prompt: original_prompt.into(),
            task_description: None,
            provider,
            model: model.into(),
            output_type,
            variant_count: default_variant_count(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            influence_text: None,
            influence_weight: 0,
            mode: OptimizationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: OptimizationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_variant_count(mut self, count: u8) -> Self {
        self.variant_count = count;
        self
    }

    pub fn with_task_description(mut self, task: impl Into<String>) -> Self {
        self.task_description = Some(task.into());
        self
    }

    pub fn with_influence(mut self, text: impl Into<String>, weight: u8) -> Self {
        self.influence_text = Some(text.into());
        self.influence_weight = weight;
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Task description, if one was given and is not blank
    pub fn task_context(&self) -> Option<&str> {
        self.task_description
            .as_deref()
            .map(str::trim)
            .filter(|task| !task.is_empty())
    }

    /// Influence text and its 0.0-1.0 strength, when influence is active
    pub fn influence(&self) -> Option<(&str, f64)> {
        let text = self.influence_text.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        if self.influence_weight == 0 {
            return None;
        }
        Some((text, f64::from(self.influence_weight) / 100.0))
    }

    /// Reject requests that must not start any work
    pub fn validate(&self) -> SharedResult<()> {
        if self.original_prompt.trim().is_empty() {
            return Err(SharedError::invalid("originalPrompt", "prompt must not be empty"));
        }
        if self.model.trim().is_empty() {
            return Err(SharedError::invalid("model", "model is required"));
        }
        if !self.provider.supports_model(&self.model) {
            return Err(SharedError::invalid(
                "model",
                format!("model '{}' is not offered by provider '{}'", self.model, self.provider),
            ));
        }
        if !(MIN_VARIANTS..=MAX_VARIANTS).contains(&self.variant_count) {
            return Err(SharedError::invalid(
                "variantCount",
                format!("must be between {MIN_VARIANTS} and {MAX_VARIANTS}, got {}", self.variant_count),
            ));
        }
        if self.max_tokens == 0 {
            return Err(SharedError::invalid("maxTokens", "must be greater than zero"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SharedError::invalid(
                "temperature",
                format!("must be between 0 and 2, got {}", self.temperature),
            ));
        }
        if self.influence_weight > MAX_INFLUENCE_WEIGHT {
            return Err(SharedError::invalid(
                "influenceWeight",
                format!("must be between 0 and 100, got {}", self.influence_weight),
            ));
        }
        Ok(())
    }
}
