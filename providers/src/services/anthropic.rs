//! Anthropic messages adapter

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use shared::{ApiFailure, ProviderId};

use super::http::{build_client, empty_content, missing_key, send_json, usage_count};
use crate::traits::ProviderAdapter;
use crate::types::{InvocationRequest, ProviderResponse};

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AnthropicAdapter {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure> {
        let api_key = self.api_key.as_deref().ok_or_else(|| missing_key("anthropic"))?;
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": request.prompt
                }
            ]
        });

        let http_request = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("Content-Type", "application/json")
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body);

        let response_json = send_json(http_request, &request.model).await?;
        let response_time = request_start.elapsed();

        // Concatenate every text block; tool blocks carry no text
        let content: String = response_json
            .get("content")
            .and_then(|content| content.as_array())
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|block| block.get("text").and_then(|text| text.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(empty_content());
        }

        let usage = response_json.get("usage");
        let input_tokens = usage_count(usage, "input_tokens");
        let output_tokens = usage_count(usage, "output_tokens");

        Ok(ProviderResponse {
            content,
            tokens_used: input_tokens + output_tokens,
            prompt_tokens: input_tokens,
            completion_tokens: output_tokens,
            model_used: request.model,
            response_time,
        })
    }
}
