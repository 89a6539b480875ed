// src/services/analytics.rs

//! Overview statistics, rankings and paginated listings over attempt history.
//!
//! Every percentage here is question-weighted: `Σscore / Σtotal_questions`,
//! so an attempt over 20 questions counts twice as much as one over 10.

use std::{cmp::Ordering, collections::HashMap};

use crate::{
    config::{MAX_PAGE_SIZE, TOP_RANKING_LIMIT},
    error::AppError,
    models::{
        analytics::{AnalyticsSnapshot, AttemptPage, RankedIdentifier, StudentProgress},
        attempt::{AttemptFilter, AttemptRecord},
    },
    store::AttemptStore,
};

/// `100 × score / total`, rounded to one decimal. Zero when `total` is zero.
pub fn weighted_percentage(score: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (score as f64 / total as f64 * 1000.0).round() / 10.0
}

#[derive(Default)]
struct Tally {
    attempts: i64,
    score: i64,
    total: i64,
}

/// Builds the overview snapshot. Empty input yields the all-zero snapshot.
pub fn overview(records: &[AttemptRecord]) -> AnalyticsSnapshot {
    if records.is_empty() {
        return AnalyticsSnapshot::default();
    }

    let mut total_score = 0;
    let mut total_questions = 0;
    let mut by_identity: HashMap<&str, Tally> = HashMap::new();

    for record in records {
        total_score += record.score;
        total_questions += record.total_questions;

        let tally = by_identity.entry(record.identity_key.as_str()).or_default();
        tally.attempts += 1;
        tally.score += record.score;
        tally.total += record.total_questions;
    }

    let mut ranking: Vec<RankedIdentifier> = by_identity
        .into_iter()
        .map(|(identifier, tally)| RankedIdentifier {
            identifier: identifier.to_string(),
            attempts: tally.attempts,
            avg_percentage: weighted_percentage(tally.score, tally.total),
        })
        .collect();
    ranking.sort_by(rank_order);
    ranking.truncate(TOP_RANKING_LIMIT);

    AnalyticsSnapshot {
        total_attempts: records.len() as i64,
        average_percentage: weighted_percentage(total_score, total_questions),
        total_questions_attempted: total_questions,
        top_identifiers: ranking,
    }
}

/// Higher percentage first, then more attempts, then identifier ascending.
fn rank_order(a: &RankedIdentifier, b: &RankedIdentifier) -> Ordering {
    b.avg_percentage
        .total_cmp(&a.avg_percentage)
        .then_with(|| b.attempts.cmp(&a.attempts))
        .then_with(|| a.identifier.cmp(&b.identifier))
}

/// Checks page arguments and caps the page size.
pub fn page_bounds(page: i64, page_size: i64) -> Result<(i64, i64), AppError> {
    if page < 1 {
        return Err(AppError::BadRequest("page must be at least 1".to_string()));
    }
    if page_size < 1 {
        return Err(AppError::BadRequest(
            "page_size must be at least 1".to_string(),
        ));
    }
    Ok((page, page_size.min(MAX_PAGE_SIZE)))
}

/// Row offset of a checked page.
pub fn page_offset(page: i64, page_size: i64) -> i64 {
    (page - 1).saturating_mul(page_size)
}

/// `ceil(total_count / page_size)`; zero when there is nothing to list.
pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    (total_count + page_size - 1) / page_size
}

/// A student's history with their mean raw score and weighted percentage.
pub fn progress(mut records: Vec<AttemptRecord>) -> StudentProgress {
    records.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at));

    let total_attempts = records.len() as i64;
    let score: i64 = records.iter().map(|r| r.score).sum();
    let total: i64 = records.iter().map(|r| r.total_questions).sum();
    let average_score = if total_attempts > 0 {
        score as f64 / total_attempts as f64
    } else {
        0.0
    };

    StudentProgress {
        total_attempts,
        average_score,
        avg_percentage: weighted_percentage(score, total),
        attempts: records,
    }
}

/// Store-backed entry points used by the dashboard handlers.
pub struct AnalyticsService<'a, S: AttemptStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: AttemptStore + ?Sized> AnalyticsService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub async fn overview(&self, filter: &AttemptFilter) -> Result<AnalyticsSnapshot, AppError> {
        filter.validate()?;
        let records = self.store.query_attempts(filter).await?;
        Ok(overview(&records))
    }

    pub async fn list(
        &self,
        filter: &AttemptFilter,
        page: i64,
        page_size: i64,
    ) -> Result<AttemptPage, AppError> {
        filter.validate()?;
        let (page, page_size) = page_bounds(page, page_size)?;

        let total_count = self.store.count_attempts(filter).await?;
        let offset = page_offset(page, page_size);

        // Past the last page: empty, but the count still stands
        let records = if offset < total_count {
            self.store
                .query_attempts_page(filter, page_size, offset)
                .await?
        } else {
            Vec::new()
        };

        Ok(AttemptPage {
            records,
            total_count,
            page,
            page_size,
            total_pages: total_pages(total_count, page_size),
        })
    }

    pub async fn progress(&self, student_email: &str) -> Result<StudentProgress, AppError> {
        let filter = AttemptFilter {
            student_email: Some(student_email.to_string()),
            ..Default::default()
        };
        let records = self.store.query_attempts(&filter).await?;
        Ok(progress(records))
    }

    pub async fn attempt(&self, attempt_id: i64) -> Result<AttemptRecord, AppError> {
        self.store
            .get_attempt(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", attempt_id)))
    }
}
