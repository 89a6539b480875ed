// src/store/memory.rs

//! In-memory stores for tests and local runs without Postgres.
//!
//! Attempt writes go straight into the shared map but stay hidden from
//! readers until committed. Rollback (or dropping an unfinished transaction)
//! deletes whatever the transaction wrote.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc, RwLock,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerOutcome, AttemptFilter, AttemptRecord, NewAttempt},
        question::{PublicQuestion, StoredQuestionSet},
    },
    store::{AttemptStore, AttemptTransaction, QuestionStore},
};

fn poisoned<T>(_: T) -> AppError {
    AppError::InternalServerError("In-memory store lock poisoned".to_string())
}

#[derive(Default)]
struct QuestionTables {
    sets: HashMap<i64, StoredQuestionSet>,
    schedule: HashMap<i64, NaiveDate>,
    questions: HashMap<i64, PublicQuestion>,
}

#[derive(Clone, Default)]
pub struct MemoryQuestionStore {
    inner: Arc<RwLock<QuestionTables>>,
}

impl MemoryQuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a daily set, optionally scheduled for a date.
    pub fn insert_set(&self, set: StoredQuestionSet, date: Option<NaiveDate>) -> Result<(), AppError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        if let Some(date) = date {
            tables.schedule.insert(set.id, date);
        }
        tables.sets.insert(set.id, set);
        Ok(())
    }

    pub fn insert_question(&self, question: PublicQuestion) -> Result<(), AppError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.questions.insert(question.id, question);
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for MemoryQuestionStore {
    async fn get_question_set(&self, set_id: i64) -> Result<Option<StoredQuestionSet>, AppError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables.sets.get(&set_id).cloned())
    }

    async fn published_set_for_date(&self, date: NaiveDate) -> Result<Option<i64>, AppError> {
        let tables = self.inner.read().map_err(poisoned)?;
        Ok(tables
            .schedule
            .iter()
            .filter(|&(id, scheduled)| {
                *scheduled == date && tables.sets.get(id).is_some_and(|s| s.is_published)
            })
            .map(|(id, _)| *id)
            .max())
    }

    async fn public_questions(&self, set_id: i64) -> Result<Vec<PublicQuestion>, AppError> {
        let tables = self.inner.read().map_err(poisoned)?;
        let Some(set) = tables.sets.get(&set_id) else {
            return Ok(Vec::new());
        };
        Ok(set
            .questions
            .iter()
            .filter_map(|q| tables.questions.get(&q.question_id).cloned())
            .collect())
    }
}

#[derive(Default)]
struct AttemptTables {
    last_id: i64,
    headers: BTreeMap<i64, AttemptRecord>,
    answers: HashMap<i64, Vec<AnswerOutcome>>,
    /// Written but not yet committed.
    pending: Vec<i64>,
}

impl AttemptTables {
    fn discard(&mut self, ids: &[i64]) {
        for id in ids {
            self.headers.remove(id);
            self.answers.remove(id);
            self.pending.retain(|p| p != id);
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryAttemptStore {
    inner: Arc<RwLock<AttemptTables>>,
    fail_details: Arc<AtomicBool>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following detail-row insert fail.
    pub fn fail_detail_inserts(&self, fail: bool) {
        self.fail_details.store(fail, Ordering::SeqCst);
    }

    /// Insert a finished attempt directly, bypassing the recorder.
    pub fn seed(&self, record: AttemptRecord) -> Result<(), AppError> {
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.last_id = tables.last_id.max(record.id);
        tables.answers.insert(record.id, record.answers.clone());
        tables.headers.insert(
            record.id,
            AttemptRecord {
                answers: Vec::new(),
                ..record
            },
        );
        Ok(())
    }

    /// Header rows physically present, committed or not.
    pub fn stored_headers(&self) -> usize {
        self.inner.read().map(|t| t.headers.len()).unwrap_or(0)
    }

    /// Detail rows physically present, committed or not.
    pub fn stored_details(&self) -> usize {
        self.inner
            .read()
            .map(|t| t.answers.values().map(Vec::len).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn begin(&self) -> Result<Box<dyn AttemptTransaction>, AppError> {
        Ok(Box::new(MemoryAttemptTransaction {
            inner: Arc::clone(&self.inner),
            fail_details: self.fail_details.load(Ordering::SeqCst),
            written: Vec::new(),
            finished: false,
        }))
    }

    async fn query_attempts(&self, filter: &AttemptFilter) -> Result<Vec<AttemptRecord>, AppError> {
        let tables = self.inner.read().map_err(poisoned)?;
        let mut records: Vec<AttemptRecord> = tables
            .headers
            .values()
            .filter(|r| !tables.pending.contains(&r.id) && filter.matches(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn count_attempts(&self, filter: &AttemptFilter) -> Result<i64, AppError> {
        let tables = self.inner.read().map_err(poisoned)?;
        let count = tables
            .headers
            .values()
            .filter(|r| !tables.pending.contains(&r.id) && filter.matches(r))
            .count();
        Ok(count as i64)
    }

    async fn query_attempts_page(
        &self,
        filter: &AttemptFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AttemptRecord>, AppError> {
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .query_attempts(filter)
            .await?
            .into_iter()
            .skip(skip)
            .take(take)
            .collect())
    }

    async fn get_attempt(&self, attempt_id: i64) -> Result<Option<AttemptRecord>, AppError> {
        let tables = self.inner.read().map_err(poisoned)?;
        if tables.pending.contains(&attempt_id) {
            return Ok(None);
        }
        Ok(tables.headers.get(&attempt_id).map(|header| AttemptRecord {
            answers: tables.answers.get(&attempt_id).cloned().unwrap_or_default(),
            ..header.clone()
        }))
    }
}

pub struct MemoryAttemptTransaction {
    inner: Arc<RwLock<AttemptTables>>,
    fail_details: bool,
    written: Vec<i64>,
    finished: bool,
}

impl MemoryAttemptTransaction {
    fn ensure_open(&self) -> Result<(), AppError> {
        if self.finished {
            return Err(AppError::InternalServerError(
                "Transaction already finished".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptTransaction for MemoryAttemptTransaction {
    async fn insert_attempt_header(&mut self, attempt: &NewAttempt) -> Result<i64, AppError> {
        self.ensure_open()?;
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.last_id += 1;
        let id = tables.last_id;
        tables
            .headers
            .insert(id, AttemptRecord::from_new(id, attempt.clone(), Vec::new()));
        tables.pending.push(id);
        self.written.push(id);
        Ok(id)
    }

    async fn insert_attempt_details(
        &mut self,
        attempt_id: i64,
        rows: &[AnswerOutcome],
    ) -> Result<(), AppError> {
        self.ensure_open()?;
        if self.fail_details {
            return Err(AppError::InternalServerError(
                "attempt_answers insert rejected".to_string(),
            ));
        }
        let mut tables = self.inner.write().map_err(poisoned)?;
        if !tables.headers.contains_key(&attempt_id) {
            return Err(AppError::InternalServerError(format!(
                "attempt {} does not exist",
                attempt_id
            )));
        }
        tables
            .answers
            .entry(attempt_id)
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        self.ensure_open()?;
        let mut tables = self.inner.write().map_err(poisoned)?;
        let written = std::mem::take(&mut self.written);
        tables.pending.retain(|id| !written.contains(id));
        self.finished = true;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), AppError> {
        if self.finished {
            return Ok(());
        }
        let mut tables = self.inner.write().map_err(poisoned)?;
        tables.discard(&std::mem::take(&mut self.written));
        self.finished = true;
        Ok(())
    }
}

impl Drop for MemoryAttemptTransaction {
    fn drop(&mut self) {
        if self.finished || self.written.is_empty() {
            return;
        }
        if let Ok(mut tables) = self.inner.write() {
            tables.discard(&self.written);
        }
    }
}
