// src/handlers/attempt.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        analytics::StudentProgress,
        attempt::{ProgressParams, SubmitAttemptRequest, SubmitAttemptResponse},
    },
    services::{analytics::AnalyticsService, pipeline},
    store::{PgAttemptStore, PgQuestionStore},
};

/// Submits a student's answers for a daily set.
///
/// * Resolves the published set and its answer key.
/// * Scores the batch; any unknown question ID rejects the whole submission.
/// * Records the attempt header and answers in one transaction.
#[utoipa::path(
    post,
    path = "/api/attempts",
    request_body = SubmitAttemptRequest,
    responses(
        (status = 201, description = "Attempt scored and recorded", body = SubmitAttemptResponse),
        (status = 400, description = "Empty or malformed submission"),
        (status = 404, description = "Daily set missing or unpublished"),
        (status = 422, description = "Unknown question, duplicate answer or empty set")
    ),
    tag = "Attempts"
)]
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let questions = PgQuestionStore::new(pool.clone());
    let attempts = PgAttemptStore::new(pool);

    let response = pipeline::submit_attempt(&questions, &attempts, &payload).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists a student's attempts (most recent first) with averages.
#[utoipa::path(
    get,
    path = "/api/progress",
    params(ProgressParams),
    responses(
        (status = 200, description = "Attempt history for the email", body = StudentProgress)
    ),
    tag = "Attempts"
)]
pub async fn get_progress(
    State(pool): State<PgPool>,
    Query(params): Query<ProgressParams>,
) -> Result<impl IntoResponse, AppError> {
    let email = params.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("email is required".to_string()));
    }

    let store = PgAttemptStore::new(pool);
    let progress = AnalyticsService::new(&store).progress(email).await?;

    Ok(Json(progress))
}
