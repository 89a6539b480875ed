// src/services/recorder.rs

use chrono::Utc;

use crate::{
    error::AppError,
    models::attempt::{AttemptRecord, AttemptResult, NewAttempt, identity_key},
    store::{AttemptStore, AttemptTransaction},
};

/// Persists a scored attempt as one unit of work.
///
/// The header and every detail row are written inside a single store
/// transaction. If any step fails the transaction is rolled back, so an
/// attempt header never survives without its answers.
pub async fn record<S>(
    store: &S,
    student_name: Option<&str>,
    student_email: Option<&str>,
    daily_set_id: i64,
    result: &AttemptResult,
) -> Result<AttemptRecord, AppError>
where
    S: AttemptStore + ?Sized,
{
    let attempt = NewAttempt {
        student_name: student_name.map(str::to_string),
        student_email: student_email.map(str::to_string),
        identity_key: identity_key(student_name, student_email),
        daily_set_id,
        score: result.correct_count,
        total_questions: result.total_questions,
        attempted_at: Utc::now(),
    };

    let mut tx = store
        .begin()
        .await
        .map_err(|e| AppError::Persistence(format!("could not open transaction: {}", e)))?;

    match write_attempt(tx.as_mut(), &attempt, result).await {
        Ok(attempt_id) => {
            tracing::info!(
                "Recorded attempt {} for '{}' on set {}: {}/{}",
                attempt_id,
                attempt.identity_key,
                daily_set_id,
                attempt.score,
                attempt.total_questions
            );
            Ok(AttemptRecord::from_new(
                attempt_id,
                attempt,
                result.outcomes.clone(),
            ))
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!("Failed to roll back attempt write: {:?}", rollback_err);
            }
            tracing::error!("Attempt for set {} not recorded: {}", daily_set_id, e);
            Err(e)
        }
    }
}

async fn write_attempt(
    tx: &mut dyn AttemptTransaction,
    attempt: &NewAttempt,
    result: &AttemptResult,
) -> Result<i64, AppError> {
    let attempt_id = tx
        .insert_attempt_header(attempt)
        .await
        .map_err(|e| AppError::Persistence(format!("attempt header: {}", e)))?;

    tx.insert_attempt_details(attempt_id, &result.outcomes)
        .await
        .map_err(|e| AppError::Persistence(format!("attempt answers: {}", e)))?;

    tx.commit()
        .await
        .map_err(|e| AppError::Persistence(format!("commit: {}", e)))?;

    Ok(attempt_id)
}
