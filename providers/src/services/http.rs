//! Helpers shared by the HTTP-backed adapters

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::ApiFailure;

/// Build a client with a per-request deadline
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a non-success HTTP status onto the shared failure kinds
pub fn failure_from_status(status: StatusCode, model: &str) -> ApiFailure {
    match status.as_u16() {
        401 | 403 => ApiFailure::Unavailable(format!("authentication rejected ({status})")),
        404 => ApiFailure::InvalidModel(model.to_string()),
        408 | 504 => ApiFailure::Timeout,
        429 => ApiFailure::RateLimited,
        _ => ApiFailure::Unavailable(format!("server error ({status})")),
    }
}

/// Map a transport error onto the shared failure kinds
pub fn failure_from_transport(error: reqwest::Error) -> ApiFailure {
    if error.is_timeout() {
        ApiFailure::Timeout
    } else {
        ApiFailure::Unavailable(format!("network error: {error}"))
    }
}

/// Send a prepared request and decode the JSON body, mapping every failure
pub async fn send_json(request: reqwest::RequestBuilder, model: &str) -> Result<Value, ApiFailure> {
    let response = request.send().await.map_err(failure_from_transport)?;

    if !response.status().is_success() {
        return Err(failure_from_status(response.status(), model));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ApiFailure::Unavailable(format!("failed to parse response: {e}")))
}

/// Read a token counter out of a usage object, zero when absent
pub fn usage_count(usage: Option<&Value>, field: &str) -> u32 {
    usage
        .and_then(|u| u.get(field))
        .and_then(Value::as_u64)
        .and_then(|count| u32::try_from(count).ok())
        .unwrap_or(0)
}

pub fn missing_key(provider: &str) -> ApiFailure {
    ApiFailure::Unavailable(format!("no API key configured for {provider}"))
}

pub fn empty_content() -> ApiFailure {
    ApiFailure::Unavailable("no content in response".to_string())
}
