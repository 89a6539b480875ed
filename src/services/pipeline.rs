// src/services/pipeline.rs

use crate::{
    error::AppError,
    models::attempt::{SubmitAttemptRequest, SubmitAttemptResponse},
    services::{recorder, resolver, scorer},
    store::{AttemptStore, QuestionStore},
};

/// Resolve → score → record for one submission.
///
/// Resolver and scorer errors return before the attempt store is touched,
/// so a rejected batch never leaves a record behind.
pub async fn submit_attempt<Q, S>(
    questions: &Q,
    attempts: &S,
    req: &SubmitAttemptRequest,
) -> Result<SubmitAttemptResponse, AppError>
where
    Q: QuestionStore + ?Sized,
    S: AttemptStore + ?Sized,
{
    scorer::ensure_non_empty(&req.answers)?;

    let question_set = resolver::resolve(questions, req.daily_set_id).await?;

    let result = scorer::score(&question_set, &req.answers).inspect_err(|e| {
        tracing::warn!("Rejected submission for set {}: {}", req.daily_set_id, e);
    })?;

    let record = recorder::record(
        attempts,
        req.student_name.as_deref(),
        req.student_email.as_deref(),
        question_set.set_id,
        &result,
    )
    .await?;

    Ok(SubmitAttemptResponse {
        attempt_id: record.id,
        score: record.score,
        total_questions: record.total_questions,
        message: "Attempt submitted successfully".to_string(),
    })
}
