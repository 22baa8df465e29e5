//! Router fixtures for the API tests

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use orchestrator::{MemoryStore, OptimizerConfig, Orchestrator};
use providers::{MockProviderAdapter, ProviderRegistry, RandomAdapter};
use serde_json::{json, Value};
use shared::{ApiFailure, ProviderId};
use tower::ServiceExt;
use webserver::{router, AppState};

pub const USER: &str = "alice";
pub const OTHER_USER: &str = "bob";
pub const PROMPT: &str = "Write code to sort a list";

/// Router over a memory store with the keyless backend and an OpenAI mock
/// that fails every call
pub fn test_router() -> Router {
    let mut failing = MockProviderAdapter::new();
    failing.expect_provider_id().return_const(ProviderId::OpenAI);
    failing.expect_invoke().returning(|_| Err(ApiFailure::RateLimited));

    let registry = ProviderRegistry::new()
        .with_adapter(Arc::new(RandomAdapter::new()))
        .with_adapter(Arc::new(failing));
    let orchestrator = Orchestrator::new(registry, MemoryStore::new(), OptimizerConfig::default().with_retry(false));

    router(AppState::new(Arc::new(orchestrator)))
}

pub fn speed_body() -> Value {
    json!({
        "originalPrompt": PROMPT,
        "provider": "random",
        "model": "random",
        "outputType": "code",
        "mode": "speed"
    })
}

pub fn post(uri: &str, user: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(body.into()).unwrap()
}

pub fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder.body(Body::empty()).unwrap()
}

/// Send one request and decode the JSON reply
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
