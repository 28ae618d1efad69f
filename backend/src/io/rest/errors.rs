//! Translation of domain errors into HTTP responses.
//!
//! Every failing endpoint answers with the shared `ErrorResponse` body:
//! `{"error": "...", "code": "...", "fields": [...]}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorResponse, FieldErrorDto};
use tracing::error;

use crate::domain::errors::MemorialError;

pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// Build an error body without field details
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: message.into(),
        code: code.to_string(),
        fields: None,
    };
    (status, Json(body)).into_response()
}

impl MemorialError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MemorialError::NotFound(_) => StatusCode::NOT_FOUND,
            MemorialError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MemorialError::AuthFailure => StatusCode::UNAUTHORIZED,
            MemorialError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MemorialError::WriteFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MemorialError::ConfirmationRequired => StatusCode::PRECONDITION_REQUIRED,
        }
    }
}

impl IntoResponse for MemorialError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (message, fields) = match &self {
            MemorialError::Validation(errors) => (
                self.to_string(),
                Some(
                    errors
                        .iter()
                        .map(|e| FieldErrorDto {
                            field: e.field.to_string(),
                            message: e.message.clone(),
                        })
                        .collect(),
                ),
            ),
            MemorialError::WriteFailure(source) => {
                error!("Memorial write failed: {:#}", source);
                ("Failed to write memorial".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
            fields,
        };
        (status, Json(body)).into_response()
    }
}
