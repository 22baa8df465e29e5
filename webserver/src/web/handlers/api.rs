//! REST API handlers
//!
//! Request bodies are read as raw bytes and parsed here so that a malformed
//! optimize request still echoes the submitted prompt in its 400 response.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use orchestrator::{catalog, PromptRecord, PromptStore, Strategy};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared::{
    process_debug, OptimizationRequest, OptimizationResponse, ProcessId, RatingOutcome, RatingRequest,
    RatingResponse,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::web::extract::UserId;

pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const MAX_HISTORY_LIMIT: usize = 100;

fn parse_body<T: DeserializeOwned>(body: &Bytes, original_prompt: Option<String>) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("malformed request body: {e}"), original_prompt))
}

/// `POST /api/optimize`
pub async fn optimize<S>(
    State(state): State<AppState<S>>,
    user: UserId,
    body: Bytes,
) -> Result<Json<OptimizationResponse>, ApiError>
where
    S: PromptStore + 'static,
{
    let value: Value = parse_body(&body, None)?;
    let original_prompt = value
        .get("originalPrompt")
        .and_then(Value::as_str)
        .map(str::to_string);

    let request: OptimizationRequest = serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("malformed request body: {e}"), original_prompt))?;

    process_debug!(
        ProcessId::current(),
        "📥 Optimize request from {}: mode={}, provider={}",
        user.as_str(),
        request.mode,
        request.provider
    );

    let result = state.orchestrator.optimize(user.as_str(), request).await?;
    Ok(Json(OptimizationResponse::from(&result)))
}

/// `POST /api/ratings`
pub async fn rate<S>(
    State(state): State<AppState<S>>,
    user: UserId,
    body: Bytes,
) -> Result<Json<RatingResponse>, ApiError>
where
    S: PromptStore + 'static,
{
    let rating: RatingRequest = parse_body(&body, None)?;
    let record_id = rating.record_id;

    match state.orchestrator.submit_rating(user.as_str(), rating).await? {
        RatingOutcome::AlreadyRated => Err(ApiError::already_rated(format!("record {record_id} already has a rating"))),
        outcome => Ok(Json(RatingResponse { record_id, outcome })),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// `GET /api/history?limit=N`
pub async fn history<S>(
    State(state): State<AppState<S>>,
    user: UserId,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<PromptRecord>>, ApiError>
where
    S: PromptStore + 'static,
{
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let records = state.orchestrator.history(user.as_str(), limit).await?;
    Ok(Json(records))
}

/// `GET /api/strategies`
pub async fn strategies() -> Json<&'static [Strategy]> {
    Json(catalog())
}
