//! # Memorial Errors
//!
//! Failure taxonomy shared by the domain services and translated to HTTP
//! responses at the REST boundary.

use std::fmt;

/// A single field-level validation failure, reported inline per form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum MemorialError {
    #[error("Memorial not found: {0}")]
    NotFound(String),

    #[error("Invalid memorial: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Invalid credentials")]
    AuthFailure,

    #[error("Memorial store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Failed to write memorial: {0}")]
    WriteFailure(#[source] anyhow::Error),

    #[error("Deleting a memorial requires explicit confirmation")]
    ConfirmationRequired,
}

impl MemorialError {
    /// Stable machine-readable code used in error bodies
    pub fn code(&self) -> &'static str {
        match self {
            MemorialError::NotFound(_) => "NOT_FOUND",
            MemorialError::Validation(_) => "VALIDATION_FAILED",
            MemorialError::AuthFailure => "AUTH_FAILED",
            MemorialError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            MemorialError::WriteFailure(_) => "WRITE_FAILED",
            MemorialError::ConfirmationRequired => "CONFIRMATION_REQUIRED",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MemorialError::NotFound(_))
    }
}
