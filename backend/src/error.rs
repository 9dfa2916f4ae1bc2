//! Error handling for the Route Billing Platform
//!
//! Every failure leaves the server as a `{"error": {"code", "message", "field"}}`
//! body with a matching status code.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Export errors
    #[error("Export failed: {0}")]
    Export(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first failing field, by name for a stable order
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));

        match fields.first() {
            Some((field, field_errors)) => {
                let message = field_errors
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::validation(camel_case(field), message)
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

impl From<shared::summary::SummaryError> for AppError {
    fn from(error: shared::summary::SummaryError) -> Self {
        use shared::summary::SummaryError;
        match error {
            SummaryError::MissingDate => AppError::validation("date", error.to_string()),
            SummaryError::UnknownFilter(_) => AppError::validation("filter", error.to_string()),
            SummaryError::Overflow(_) => AppError::validation("total", error.to_string()),
            SummaryError::InvalidOffset(_) | SummaryError::InvalidDateFormat(_) => {
                AppError::Internal(error.to_string())
            }
        }
    }
}

impl From<shared::calculator::AmountOverflow> for AppError {
    fn from(error: shared::calculator::AmountOverflow) -> Self {
        AppError::validation("items", error.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

/// `name_en` -> `nameEn`, matching the JSON field names
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::Export(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "EXPORT_ERROR".to_string(),
                    message: format!("Export failed: {}", msg),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CreateRouteInput;
    use validator::Validate;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::validation("name", "bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("Bill".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Export("font".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validator_errors_name_the_field() {
        let input = CreateRouteInput {
            name: String::new(),
            description: None,
        };
        let error: AppError = input.validate().unwrap_err().into();
        match error {
            AppError::Validation { field, message } => {
                assert_eq!(field, "name");
                assert_eq!(message, "Route name cannot be empty");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_overflow_is_a_validation_error() {
        use shared::calculator::AmountOverflow;
        use shared::summary::SummaryError;

        let error: AppError = AmountOverflow.into();
        match &error {
            AppError::Validation { field, message } => {
                assert_eq!(field, "items");
                assert_eq!(message, "Amount is too large to calculate");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error: AppError = SummaryError::Overflow(AmountOverflow).into();
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error: AppError = SummaryError::InvalidDateFormat("%Q".into()).into();
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("name_en"), "nameEn");
        assert_eq!(camel_case("gst_total"), "gstTotal");
        assert_eq!(camel_case("rate"), "rate");
    }
}
