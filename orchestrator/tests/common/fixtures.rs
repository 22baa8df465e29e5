//! Canned requests and provider answers

use shared::{OptimizationMode, OptimizationRequest, OutputType, ProviderId};

pub struct TestFixtures;

impl TestFixtures {
    pub const USER: &'static str = "alice";
    pub const OTHER_USER: &'static str = "bob";
    pub const CODE_PROMPT: &'static str = "Write code to sort a list";
    pub const OPENAI_MODEL: &'static str = "gpt-4o-mini";

    /// Marker present in every rewrite instruction but never in a test call
    pub const REWRITE_MARKER: &'static str = "Return only the rewritten prompt";
    /// Fragment unique to the structure strategy's rewrite template
    pub const STRUCTURE_MARKER: &'static str = "with a clear structure";

    pub fn speed_request() -> OptimizationRequest {
        OptimizationRequest::new(Self::CODE_PROMPT, ProviderId::OpenAI, Self::OPENAI_MODEL, OutputType::Code)
            .with_mode(OptimizationMode::Speed)
    }

    pub fn deep_request(variants: u8) -> OptimizationRequest {
        OptimizationRequest::new(Self::CODE_PROMPT, ProviderId::OpenAI, Self::OPENAI_MODEL, OutputType::Code)
            .with_mode(OptimizationMode::Deep)
            .with_variant_count(variants)
    }

    /// What a well-behaved model returns for a rewrite call
    pub fn rewritten_prompt() -> String {
        "Goal: write a function that sorts a list of integers.\n\
         1. Handle an empty list.\n\
         2. Include an example call with its expected output.\n\
         You must return the code in a single fenced block."
            .to_string()
    }

    /// What a well-behaved model returns for a test call
    pub fn sample_answer() -> String {
        "```python\ndef sort_list(items):\n    return sorted(items)\n```\n\nExample: sort_list([3, 1, 2]) returns [1, 2, 3]."
            .to_string()
    }
}
