//! Keyless backend that fabricates plausible text
//!
//! Lets the whole pipeline run with no credentials. When the prompt carries
//! a `"""`-fenced original, the answer echoes that original plus a couple of
//! directive sentences so rewrite calls produce usable prompts.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{ApiFailure, ProviderId};

use crate::traits::ProviderAdapter;
use crate::types::{InvocationRequest, ProviderResponse};

const FENCE: &str = "\"\"\"";

const DIRECTIVES: &[&str] = &[
    "State the goal in one sentence before giving details.",
    "Include at least one concrete example.",
    "Use numbered steps where order matters.",
    "Keep the answer focused on the stated purpose.",
    "Specify the expected format of the output.",
    "Mention any constraints the answer must respect.",
    "Define the intended audience for the response.",
    "Avoid filler and repeat nothing.",
];

const SENTENCES: &[&str] = &[
    "The main point is summarised first so the reader sees the outcome immediately.",
    "Each step builds on the previous one and includes a short example.",
    "Edge cases are listed separately with the reasoning behind each.",
    "The answer closes with a brief recap of the key requirements.",
    "Terminology is defined where it first appears to keep things clear.",
    "A concrete scenario illustrates how the approach works in practice.",
];

#[derive(Debug, Clone, Default)]
pub struct RandomAdapter {
    latency: Duration,
}

impl RandomAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long per call to imitate a real backend
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

/// Text between the first pair of `"""` fences, trimmed
pub fn fenced_original(prompt: &str) -> Option<&str> {
    let start = prompt.find(FENCE)? + FENCE.len();
    let rest = &prompt[start..];
    let end = rest.find(FENCE)?;
    Some(rest[..end].trim()).filter(|text| !text.is_empty())
}

fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    text.chars().take(max_chars).collect()
}

fn fabricate(prompt: &str) -> String {
    let mut rng = rand::thread_rng();

    match fenced_original(prompt) {
        Some(original) => {
            let picks: Vec<&str> = DIRECTIVES.choose_multiple(&mut rng, 2).copied().collect();
            format!("{original}\n\n{}", picks.join(" "))
        }
        None => {
            let count = rng.gen_range(2..=SENTENCES.len());
            let picks: Vec<&str> = SENTENCES.choose_multiple(&mut rng, count).copied().collect();
            picks.join(" ")
        }
    }
}

#[async_trait]
impl ProviderAdapter for RandomAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Random
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure> {
        let request_start = Instant::now();
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let max_chars = usize::try_from(request.max_tokens)
            .unwrap_or(usize::MAX)
            .saturating_mul(4);
        let content = truncate_chars(fabricate(&request.prompt), max_chars);

        Ok(ProviderResponse::from_text(
            content,
            &request.model,
            request_start.elapsed(),
        ))
    }
}
