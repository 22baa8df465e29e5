//! Google Gemini generateContent adapter

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use shared::{ApiFailure, ProviderId};

use super::http::{build_client, empty_content, missing_key, send_json, usage_count};
use crate::traits::ProviderAdapter;
use crate::types::{InvocationRequest, ProviderResponse};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiAdapter {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiAdapter {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn provider_id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn invoke(&self, request: InvocationRequest) -> Result<ProviderResponse, ApiFailure> {
        let api_key = self.api_key.as_deref().ok_or_else(|| missing_key("gemini"))?;
        let request_start = Instant::now();

        let request_body = serde_json::json!({
            "contents": [
                {
                    "parts": [
                        {
                            "text": request.prompt
                        }
                    ]
                }
            ],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
                "temperature": request.temperature
            }
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, request.model
        );

        let http_request = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .header("Content-Type", "application/json")
            .json(&request_body);

        let response_json = send_json(http_request, &request.model).await?;
        let response_time = request_start.elapsed();

        let content = response_json
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(|text| text.as_str())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(empty_content)?;

        // Gemini doesn't always provide token counts in the response
        let usage_metadata = response_json.get("usageMetadata");
        let prompt_token_count = usage_count(usage_metadata, "promptTokenCount");
        let candidates_token_count = usage_count(usage_metadata, "candidatesTokenCount");

        Ok(ProviderResponse {
            content: content.to_string(),
            tokens_used: prompt_token_count + candidates_token_count,
            prompt_tokens: prompt_token_count,
            completion_tokens: candidates_token_count,
            model_used: request.model,
            response_time,
        })
    }
}
