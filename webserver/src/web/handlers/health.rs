//! Liveness endpoint

use axum::extract::State;
use axum::Json;
use orchestrator::PromptStore;
use serde_json::{json, Value};

use crate::state::AppState;

/// `GET /health`
pub async fn health<S>(State(state): State<AppState<S>>) -> Json<Value>
where
    S: PromptStore + 'static,
{
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
        "unsyncedRecords": state.orchestrator.unsynced_count().await,
    }))
}
