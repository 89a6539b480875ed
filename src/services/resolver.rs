// src/services/resolver.rs

use std::collections::HashSet;

use crate::{
    error::AppError,
    models::question::{QuestionRef, QuestionSet},
    store::QuestionStore,
};

/// Resolves a daily set into the ordered answer key used for scoring.
///
/// * Missing or unpublished sets are `NotFound`; students must never see a draft.
/// * A published set without questions is `EmptySet`, which blocks submission.
/// * Duplicate question links keep their first position.
pub async fn resolve<Q>(store: &Q, set_id: i64) -> Result<QuestionSet, AppError>
where
    Q: QuestionStore + ?Sized,
{
    let stored = store
        .get_question_set(set_id)
        .await?
        .filter(|set| set.is_published)
        .ok_or_else(|| AppError::NotFound(format!("Invalid daily set ID: {}", set_id)))?;

    if stored.questions.is_empty() {
        return Err(AppError::EmptySet(set_id));
    }

    let mut seen = HashSet::new();
    let questions: Vec<QuestionRef> = stored
        .questions
        .into_iter()
        .filter(|q| seen.insert(q.question_id))
        .collect();

    Ok(QuestionSet {
        set_id: stored.id,
        questions,
    })
}
