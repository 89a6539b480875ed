// src/store/postgres.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerOutcome, AttemptFilter, AttemptRecord, NewAttempt},
        question::{PublicQuestion, QuestionRef, StoredQuestionSet},
    },
    store::{AttemptStore, AttemptTransaction, QuestionStore},
};

const ATTEMPT_COLUMNS: &str = "id, student_name, student_email, identity_key, daily_set_id, \
                               score, total_questions, attempted_at";

/// Read-only view over `daily_sets`, `daily_set_questions` and `questions`.
#[derive(Clone)]
pub struct PgQuestionStore {
    pool: PgPool,
}

impl PgQuestionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionStore for PgQuestionStore {
    async fn get_question_set(&self, set_id: i64) -> Result<Option<StoredQuestionSet>, AppError> {
        let header: Option<(i64, bool)> =
            sqlx::query_as("SELECT id, is_published FROM daily_sets WHERE id = $1")
                .bind(set_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to fetch daily set {}: {:?}", set_id, e);
                    AppError::from(e)
                })?;

        let Some((id, is_published)) = header else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRef>(
            r#"
            SELECT
                dsq.question_id,
                q.correct_answer
            FROM daily_set_questions dsq
            JOIN questions q ON q.id = dsq.question_id
            WHERE dsq.daily_set_id = $1
            ORDER BY dsq.position, dsq.question_id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch answer key for set {}: {:?}", id, e);
            AppError::from(e)
        })?;

        Ok(Some(StoredQuestionSet {
            id,
            is_published,
            questions,
        }))
    }

    async fn published_set_for_date(&self, date: NaiveDate) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM daily_sets
            WHERE date = $1 AND is_published = TRUE
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    async fn public_questions(&self, set_id: i64) -> Result<Vec<PublicQuestion>, AppError> {
        let questions = sqlx::query_as::<_, PublicQuestion>(
            r#"
            SELECT
                q.id,
                q.question_text,
                q.options,
                q.topic
            FROM daily_set_questions dsq
            JOIN questions q ON q.id = dsq.question_id
            WHERE dsq.daily_set_id = $1
            ORDER BY dsq.position, dsq.question_id
            "#,
        )
        .bind(set_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions for set {}: {:?}", set_id, e);
            AppError::from(e)
        })?;

        Ok(questions)
    }
}

/// Append-only access to `attempts` and `attempt_answers`.
#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

/// Appends the WHERE clause shared by the attempt queries.
fn push_filter(query_builder: &mut QueryBuilder<'_, Postgres>, filter: &AttemptFilter) {
    query_builder.push(" WHERE TRUE");

    if let Some(set_id) = filter.daily_set_id {
        query_builder.push(" AND daily_set_id = ").push_bind(set_id);
    }
    if let Some(email) = &filter.student_email {
        query_builder
            .push(" AND student_email = ")
            .push_bind(email.clone());
    }
    if let Some(start) = filter.start_date {
        query_builder.push(" AND attempted_at >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        query_builder.push(" AND attempted_at <= ").push_bind(end);
    }
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn begin(&self) -> Result<Box<dyn AttemptTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgAttemptTransaction { tx: Some(tx) }))
    }

    async fn query_attempts(&self, filter: &AttemptFilter) -> Result<Vec<AttemptRecord>, AppError> {
        let mut query_builder = QueryBuilder::<Postgres>::new("SELECT ");
        query_builder.push(ATTEMPT_COLUMNS);
        query_builder.push(" FROM attempts");
        push_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY attempted_at DESC, id DESC");

        let records: Vec<AttemptRecord> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query attempts: {:?}", e);
                AppError::from(e)
            })?;

        Ok(records)
    }

    async fn count_attempts(&self, filter: &AttemptFilter) -> Result<i64, AppError> {
        let mut query_builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM attempts");
        push_filter(&mut query_builder, filter);

        let count: i64 = query_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count attempts: {:?}", e);
                AppError::from(e)
            })?;

        Ok(count)
    }

    async fn query_attempts_page(
        &self,
        filter: &AttemptFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AttemptRecord>, AppError> {
        let mut query_builder = QueryBuilder::<Postgres>::new("SELECT ");
        query_builder.push(ATTEMPT_COLUMNS);
        query_builder.push(" FROM attempts");
        push_filter(&mut query_builder, filter);
        query_builder.push(" ORDER BY attempted_at DESC, id DESC");
        query_builder.push(" LIMIT ").push_bind(limit);
        query_builder.push(" OFFSET ").push_bind(offset);

        let records: Vec<AttemptRecord> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to query attempt page: {:?}", e);
                AppError::from(e)
            })?;

        Ok(records)
    }

    async fn get_attempt(&self, attempt_id: i64) -> Result<Option<AttemptRecord>, AppError> {
        let query = format!("SELECT {} FROM attempts WHERE id = $1", ATTEMPT_COLUMNS);
        let header = sqlx::query_as::<_, AttemptRecord>(&query)
            .bind(attempt_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut record) = header else {
            return Ok(None);
        };

        record.answers = sqlx::query_as::<_, AnswerOutcome>(
            r#"
            SELECT question_id, selected_answer, is_correct
            FROM attempt_answers
            WHERE attempt_id = $1
            ORDER BY id
            "#,
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(record))
    }
}

/// One Postgres transaction. Dropping it without `commit` rolls back.
pub struct PgAttemptTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgAttemptTransaction {
    fn active(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::InternalServerError("Transaction already finished".to_string()))
    }
}

#[async_trait]
impl AttemptTransaction for PgAttemptTransaction {
    async fn insert_attempt_header(&mut self, attempt: &NewAttempt) -> Result<i64, AppError> {
        let tx = self.active()?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO attempts
            (student_name, student_email, identity_key, daily_set_id, score, total_questions, attempted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&attempt.student_name)
        .bind(&attempt.student_email)
        .bind(&attempt.identity_key)
        .bind(attempt.daily_set_id)
        .bind(attempt.score)
        .bind(attempt.total_questions)
        .bind(attempt.attempted_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    async fn insert_attempt_details(
        &mut self,
        attempt_id: i64,
        rows: &[AnswerOutcome],
    ) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.active()?;

        let mut query_builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO attempt_answers (attempt_id, question_id, selected_answer, is_correct) ",
        );
        query_builder.push_values(rows, |mut b, row| {
            b.push_bind(attempt_id)
                .push_bind(row.question_id)
                .push_bind(row.selected_answer.clone())
                .push_bind(row.is_correct);
        });

        query_builder.build().execute(&mut **tx).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(AppError::InternalServerError(
                "Transaction already finished".to_string(),
            )),
        }
    }

    async fn rollback(&mut self) -> Result<(), AppError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.rollback().await?),
            None => Ok(()),
        }
    }
}
