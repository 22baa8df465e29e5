//! Shared error types for the prompt optimization system

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Invalid request field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl SharedError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SharedError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
