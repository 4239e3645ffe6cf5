//! Error types for plan loading, validation and sensitivity analysis

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Variable not found: {0}")]
    VariableNotFound(String),

    #[error("Variable at {0} is not numeric")]
    NotNumeric(String),

    #[error("Value at {0} is derived from its children; vary a child amount instead")]
    DerivedValue(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlanError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PlanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
