// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{config::ANONYMOUS_IDENTITY, error::AppError};

/// A single answer as sent by the client. Untrusted until scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_answer: String,
}

impl SubmittedAnswer {
    pub fn new(question_id: i64, selected_answer: impl Into<String>) -> Self {
        Self {
            question_id,
            selected_answer: selected_answer.into(),
        }
    }
}

/// Per-question outcome. Stored as an 'attempt_answers' row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct AnswerOutcome {
    pub question_id: i64,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Output of the scorer, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptResult {
    /// Size of the resolved set, not the number of answers sent.
    pub total_questions: i64,
    pub correct_count: i64,
    /// Outcomes in submission order.
    pub outcomes: Vec<AnswerOutcome>,
}

/// Attempt header about to be inserted.
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub identity_key: String,
    pub daily_set_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub attempted_at: DateTime<Utc>,
}

/// Represents the 'attempts' table in the database.
/// Append-only: created once by the recorder and never updated.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct AttemptRecord {
    pub id: i64,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    /// Grouping key for analytics, fixed at write time.
    pub identity_key: String,
    pub daily_set_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub attempted_at: DateTime<Utc>,

    /// Detail rows. Only loaded for single-attempt reads.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<AnswerOutcome>,
}

impl AttemptRecord {
    pub fn from_new(id: i64, attempt: NewAttempt, answers: Vec<AnswerOutcome>) -> Self {
        Self {
            id,
            student_name: attempt.student_name,
            student_email: attempt.student_email,
            identity_key: attempt.identity_key,
            daily_set_id: attempt.daily_set_id,
            score: attempt.score,
            total_questions: attempt.total_questions,
            attempted_at: attempt.attempted_at,
            answers,
        }
    }
}

/// Email if present, else name, else "anonymous".
/// Blank strings count as absent; present values are kept as sent.
pub fn identity_key(student_name: Option<&str>, student_email: Option<&str>) -> String {
    fn present(v: Option<&str>) -> Option<&str> {
        v.filter(|s| !s.trim().is_empty())
    }

    present(student_email)
        .or_else(|| present(student_name))
        .unwrap_or(ANONYMOUS_IDENTITY)
        .to_string()
}

/// Reads an optional string, treating blank or whitespace-only input as missing.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Filter over attempt history. Date bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttemptFilter {
    pub daily_set_id: Option<i64>,
    pub student_email: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl AttemptFilter {
    pub fn validate(&self) -> Result<(), AppError> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(AppError::InvalidRange { start, end });
            }
        }
        Ok(())
    }

    pub fn matches(&self, record: &AttemptRecord) -> bool {
        self.daily_set_id.is_none_or(|id| record.daily_set_id == id)
            && self
                .student_email
                .as_deref()
                .is_none_or(|email| record.student_email.as_deref() == Some(email))
            && self.start_date.is_none_or(|start| record.attempted_at >= start)
            && self.end_date.is_none_or(|end| record.attempted_at <= end)
    }
}

/// Query parameters for the analytics overview.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverviewParams {
    pub daily_set_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<OverviewParams> for AttemptFilter {
    fn from(params: OverviewParams) -> Self {
        Self {
            daily_set_id: params.daily_set_id,
            student_email: None,
            start_date: params.start_date,
            end_date: params.end_date,
        }
    }
}

/// Query parameters for listing attempts.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttemptListParams {
    pub daily_set_id: Option<i64>,
    pub student_email: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    /// 1-based page number (default: 1).
    pub page: Option<i64>,

    /// Number of items per page (default: 20, max: 100).
    pub page_size: Option<i64>,
}

impl AttemptListParams {
    pub fn filter(&self) -> AttemptFilter {
        AttemptFilter {
            daily_set_id: self.daily_set_id,
            student_email: self.student_email.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProgressParams {
    pub email: String,
}

/// DTO for submitting an attempt.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitAttemptRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(length(max = 100, message = "Name must be at most 100 chars"))]
    pub student_name: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(email(message = "Email is not valid"))]
    pub student_email: Option<String>,

    pub daily_set_id: i64,

    #[validate(length(max = 500, message = "Too many answers in one submission"))]
    pub answers: Vec<SubmittedAnswer>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitAttemptResponse {
    pub attempt_id: i64,
    pub score: i64,
    pub total_questions: i64,
    pub message: String,
}
