//! Provider request and response data

use std::time::Duration;

/// A single call to a backend, already validated and clamped by the registry
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Normalized backend answer
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub content: String,
    pub tokens_used: u32,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub model_used: String,
    pub response_time: Duration,
}

impl ProviderResponse {
    /// Response for adapters that only know the text
    pub fn from_text(content: impl Into<String>, model: &str, response_time: Duration) -> Self {
        let content = content.into();
        let completion_tokens = estimate_tokens(&content);
        Self {
            content,
            tokens_used: completion_tokens,
            prompt_tokens: 0,
            completion_tokens,
            model_used: model.to_string(),
            response_time,
        }
    }
}

/// Rough token count used when a backend reports none (4 characters per token)
pub fn estimate_tokens(text: &str) -> u32 {
    let tokens = text.chars().count().div_ceil(4);
    u32::try_from(tokens).unwrap_or(u32::MAX)
}
