//! WebServer-specific error types
//!
//! `WebServerError` covers the server's own lifecycle. `ApiError` is the
//! caller-facing rendering of a failed request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orchestrator::OrchestratorError;
use shared::{process_error, process_warn, ErrorResponse, ProcessId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebServerError {
    #[error("Failed to bind {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    ServeFailed(#[source] std::io::Error),

    #[error("Orchestrator error: {0}")]
    Orchestrator(#[from] OrchestratorError),
}

pub type WebServerResult<T> = Result<T, WebServerError>;

/// A failed API call: status plus the JSON error body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &str, reason: impl Into<String>, original_prompt: Option<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(error, reason, original_prompt),
        }
    }

    pub fn bad_request(reason: impl Into<String>, original_prompt: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", reason, original_prompt)
    }

    pub fn already_rated(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "already_rated", reason, None)
    }
}

/// Status for each orchestration failure
pub fn status_for(error: &OrchestratorError) -> StatusCode {
    match error {
        OrchestratorError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        OrchestratorError::NoVariantsGenerated { .. } => StatusCode::BAD_GATEWAY,
        OrchestratorError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        OrchestratorError::RatingRejected { .. } => StatusCode::FORBIDDEN,
        OrchestratorError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
        OrchestratorError::PersistenceFailure { .. }
        | OrchestratorError::InvalidTransition { .. }
        | OrchestratorError::IoError(_)
        | OrchestratorError::JsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(error: OrchestratorError) -> Self {
        let status = status_for(&error);
        if status.is_server_error() {
            process_error!(ProcessId::current(), "❌ Request failed: {}", error);
        } else {
            process_warn!(ProcessId::current(), "Request rejected ({}): {}", status, error);
        }

        Self::new(
            status,
            error.kind(),
            error.to_string(),
            error.original_prompt().map(str::to_string),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
