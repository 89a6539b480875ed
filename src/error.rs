// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

/// Global Application Error Enum.
/// Centralizes the scoring/analytics error taxonomy and its mapping to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Daily set is missing or not published.
    #[error("{0}")]
    NotFound(String),

    /// Daily set exists but has no linked questions.
    #[error("Daily set {0} has no questions")]
    EmptySet(i64),

    #[error("No answers submitted")]
    EmptySubmission,

    /// The batch references a question outside the resolved set.
    #[error("Invalid question ID: {0}")]
    UnknownQuestion(i64),

    /// The batch answers the same question more than once.
    #[error("Duplicate answer for question ID: {0}")]
    DuplicateAnswer(i64),

    /// Writing the attempt failed; any partial write has been rolled back.
    #[error("Failed to save attempt: {0}")]
    Persistence(String),

    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("{0}")]
    AuthError(String),

    // 500 Internal Server Error
    #[error("{0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmptySet(_) | AppError::UnknownQuestion(_) | AppError::DuplicateAnswer(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::EmptySubmission
            | AppError::InvalidRange { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Persistence(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                "Internal Server Error".to_string()
            }
            AppError::Persistence(msg) => {
                tracing::error!("Persistence failure: {}", msg);
                self.to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_question_names_the_offending_id() {
        let err = AppError::UnknownQuestion(9);
        assert_eq!(err.to_string(), "Invalid question ID: 9");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn persistence_maps_to_500() {
        let err = AppError::Persistence("detail rows".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_submission_is_a_bad_request() {
        assert_eq!(
            AppError::EmptySubmission.status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
