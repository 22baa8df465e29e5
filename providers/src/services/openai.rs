//! OpenAI chat completions adapter

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use shared::{ApiFailure, ProviderId};

use super::http::{build_client, empty_content, missing_key, send_json, usage_count};
use crate::traits::ProviderAdapter;
use crate::types::{InvocationRequest, ProviderResponse};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Point the adapter at another host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::OpenAI
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure> {
        let api_key = self.api_key.as_deref().ok_or_else(|| missing_key("openai"))?;
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "model": request.model,
            "messages": [
                {
                    "role": "user",
                    "content": request.prompt
                }
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature
        });

        let http_request = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request_body);

        let response_json = send_json(http_request, &request.model).await?;
        let response_time = request_start.elapsed();

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(empty_content)?;

        let usage = response_json.get("usage");
        let prompt_tokens = usage_count(usage, "prompt_tokens");
        let completion_tokens = usage_count(usage, "completion_tokens");
        let total_tokens = match usage_count(usage, "total_tokens") {
            0 => prompt_tokens + completion_tokens,
            total => total,
        };

        Ok(ProviderResponse {
            content: content.to_string(),
            tokens_used: total_tokens,
            prompt_tokens,
            completion_tokens,
            model_used: request.model,
            response_time,
        })
    }
}
