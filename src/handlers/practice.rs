// src/handlers/practice.rs

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::question::PracticeSet,
    store::{PgQuestionStore, QuestionStore},
};

/// Returns today's published set (UTC date) without correct answers.
pub async fn load_practice_set<Q>(store: &Q) -> Result<PracticeSet, AppError>
where
    Q: QuestionStore + ?Sized,
{
    let today = Utc::now().date_naive();

    let daily_set_id = store
        .published_set_for_date(today)
        .await?
        .ok_or_else(|| AppError::NotFound("No daily set found for today".to_string()))?;

    let questions = store.public_questions(daily_set_id).await?;

    Ok(PracticeSet {
        daily_set_id,
        questions,
    })
}

#[utoipa::path(
    get,
    path = "/api/practice/today",
    responses(
        (status = 200, description = "Today's questions", body = PracticeSet),
        (status = 404, description = "Nothing published for today")
    ),
    tag = "Practice"
)]
pub async fn get_todays_set(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let store = PgQuestionStore::new(pool);
    let practice = load_practice_set(&store).await?;

    Ok(Json(practice))
}
