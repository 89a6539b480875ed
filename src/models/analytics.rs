// src/models/analytics.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::attempt::AttemptRecord;

/// Aggregate view over attempt history. Recomputed per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsSnapshot {
    pub total_attempts: i64,
    /// Question-weighted, rounded to one decimal.
    pub average_percentage: f64,
    pub total_questions_attempted: i64,
    pub top_identifiers: Vec<RankedIdentifier>,
}

/// One leaderboard row, folded over all attempts sharing an identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankedIdentifier {
    pub identifier: String,
    pub attempts: i64,
    pub avg_percentage: f64,
}

/// Paginated attempt listing, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttemptPage {
    pub records: Vec<AttemptRecord>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// A single student's attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentProgress {
    pub total_attempts: i64,
    /// Mean raw score per attempt.
    pub average_score: f64,
    /// Question-weighted percentage, rounded to one decimal.
    pub avg_percentage: f64,
    pub attempts: Vec<AttemptRecord>,
}
