// src/store/mod.rs

//! Storage seams consumed by the scoring pipeline and analytics.
//!
//! The question store is a read-only view over published daily sets; the
//! attempt store is append-only. Writes go through an [`AttemptTransaction`]
//! so the header and its detail rows land together or not at all.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerOutcome, AttemptFilter, AttemptRecord, NewAttempt},
        question::{PublicQuestion, StoredQuestionSet},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryAttemptStore, MemoryQuestionStore};
pub use postgres::{PgAttemptStore, PgQuestionStore};

#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Fetch a daily set with its answer key, published or not.
    /// Returns `None` if no set has this ID.
    async fn get_question_set(&self, set_id: i64) -> Result<Option<StoredQuestionSet>, AppError>;

    /// ID of the published set scheduled for `date`, if any.
    async fn published_set_for_date(&self, date: NaiveDate) -> Result<Option<i64>, AppError>;

    /// Student-facing questions of a set, without answers.
    async fn public_questions(&self, set_id: i64) -> Result<Vec<PublicQuestion>, AppError>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Open a unit of work for recording one attempt.
    async fn begin(&self) -> Result<Box<dyn AttemptTransaction>, AppError>;

    /// Attempt headers matching `filter`, most recent first.
    /// Detail rows are not loaded.
    async fn query_attempts(&self, filter: &AttemptFilter) -> Result<Vec<AttemptRecord>, AppError>;

    /// Number of attempts matching `filter`.
    async fn count_attempts(&self, filter: &AttemptFilter) -> Result<i64, AppError>;

    /// One window of [`query_attempts`](AttemptStore::query_attempts), in the same order.
    async fn query_attempts_page(
        &self,
        filter: &AttemptFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AttemptRecord>, AppError>;

    /// One attempt with its detail rows.
    async fn get_attempt(&self, attempt_id: i64) -> Result<Option<AttemptRecord>, AppError>;
}

/// Scoped write access to the attempt store.
///
/// Nothing written through a transaction is visible to readers until
/// [`commit`](AttemptTransaction::commit) succeeds. Dropping an uncommitted
/// transaction discards its writes.
#[async_trait]
pub trait AttemptTransaction: Send {
    /// Insert the attempt header and return the assigned ID.
    async fn insert_attempt_header(&mut self, attempt: &NewAttempt) -> Result<i64, AppError>;

    async fn insert_attempt_details(
        &mut self,
        attempt_id: i64,
        rows: &[AnswerOutcome],
    ) -> Result<(), AppError>;

    async fn commit(&mut self) -> Result<(), AppError>;

    async fn rollback(&mut self) -> Result<(), AppError>;
}
