use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::state_machine::errors::StateMachineError;

/// Errors surfaced by the booking core
#[derive(Debug, Error)]
pub enum BookingError {
    /// Malformed or policy-violating input, rejected before any lock is taken
    #[error("Validation error on `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Overlapping range, reported with the record that blocks it
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        conflict_date: Option<NaiveDate>,
        conflicting_id: Option<Uuid>,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Deletion forbidden for {entity}: {reason}")]
    DeletionForbidden { entity: &'static str, reason: String },

    #[error("State transition error: {0}")]
    StateTransition(#[from] StateMachineError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BookingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn deletion_forbidden(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::DeletionForbidden {
            entity,
            reason: reason.into(),
        }
    }

    /// Field the UI should highlight, when the error is field-scoped
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BookingError>;
