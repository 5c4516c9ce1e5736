//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_claims::{ClaimError, SubmissionIssue};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(Vec<SubmissionIssue>),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<SubmissionIssue>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, issues) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(issues) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_failed",
                "Submission validation failed".to_string(),
                Some(issues),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            issues,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::ValidationFailed(issues) => ApiError::Validation(issues),
            ClaimError::InvalidTransition { .. }
            | ClaimError::StaleWrite { .. }
            | ClaimError::NotReconcilable { .. }
            | ClaimError::Superseded(_) => ApiError::Conflict(err.to_string()),
            ClaimError::ClaimNotFound(_) | ClaimError::DraftNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            ClaimError::UnknownTask { .. } => ApiError::NotFound(err.to_string()),
            ClaimError::AmountInvariant(_) => ApiError::BadRequest(err.to_string()),
            ClaimError::Money(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}
