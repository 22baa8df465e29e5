//! Orchestrator-specific error types

use thiserror::Error;
use uuid::Uuid;

use crate::core::state::OptimizationPhase;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        reason: String,
        original_prompt: Option<String>,
    },

    #[error("No variants generated: all {attempted} strategies failed")]
    NoVariantsGenerated {
        attempted: usize,
        failures: Vec<String>,
        original_prompt: String,
    },

    #[error("Optimization cancelled before completion")]
    Cancelled { original_prompt: String },

    #[error("Persistence failed: {reason}")]
    PersistenceFailure { reason: String },

    #[error("Rating rejected for record {record_id}: {reason}")]
    RatingRejected { record_id: Uuid, reason: String },

    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: Uuid },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: OptimizationPhase,
        to: OptimizationPhase,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn invalid_request(reason: impl Into<String>, original_prompt: impl Into<String>) -> Self {
        OrchestratorError::InvalidRequest {
            reason: reason.into(),
            original_prompt: Some(original_prompt.into()),
        }
    }

    pub fn persistence(reason: impl std::fmt::Display) -> Self {
        OrchestratorError::PersistenceFailure {
            reason: reason.to_string(),
        }
    }

    /// The prompt the caller submitted, when the failure came from an optimization run
    pub fn original_prompt(&self) -> Option<&str> {
        match self {
            OrchestratorError::InvalidRequest { original_prompt, .. } => original_prompt.as_deref(),
            OrchestratorError::NoVariantsGenerated { original_prompt, .. }
            | OrchestratorError::Cancelled { original_prompt } => Some(original_prompt),
            _ => None,
        }
    }

    /// Stable machine-readable name for the failure
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorError::InvalidRequest { .. } => "invalid_request",
            OrchestratorError::NoVariantsGenerated { .. } => "no_variants_generated",
            OrchestratorError::Cancelled { .. } => "cancelled",
            OrchestratorError::PersistenceFailure { .. } => "persistence_failure",
            OrchestratorError::RatingRejected { .. } => "rating_rejected",
            OrchestratorError::RecordNotFound { .. } => "record_not_found",
            OrchestratorError::InvalidTransition { .. } => "invalid_transition",
            OrchestratorError::IoError(_) => "io_error",
            OrchestratorError::JsonError(_) => "json_error",
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_prompt_preserved_for_caller_failures() {
        let err = OrchestratorError::invalid_request("prompt must not be empty", "  ");
        assert_eq!(err.original_prompt(), Some("  "));

        let err = OrchestratorError::NoVariantsGenerated {
            attempted: 3,
            failures: vec!["clarity: provider timeout".to_string()],
            original_prompt: "Write code".to_string(),
        };
        assert_eq!(err.original_prompt(), Some("Write code"));
        assert_eq!(err.kind(), "no_variants_generated");

        let err = OrchestratorError::RecordNotFound { record_id: Uuid::nil() };
        assert_eq!(err.original_prompt(), None);
    }
}
