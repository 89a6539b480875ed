// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use utoipa::ToSchema;

/// One question of a daily set together with its answer key.
/// The correct answer is an opaque string compared by exact match.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct QuestionRef {
    pub question_id: i64,
    pub correct_answer: String,
}

impl QuestionRef {
    pub fn new(question_id: i64, correct_answer: impl Into<String>) -> Self {
        Self {
            question_id,
            correct_answer: correct_answer.into(),
        }
    }
}

/// A published daily set as handed to the scorer.
/// Never empty, and every question ID appears once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    pub set_id: i64,
    pub questions: Vec<QuestionRef>,
}

impl QuestionSet {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Raw view of a daily set as the question store returns it.
#[derive(Debug, Clone)]
pub struct StoredQuestionSet {
    pub id: i64,
    pub is_published: bool,
    pub questions: Vec<QuestionRef>,
}

/// DTO for sending a question to students (excludes the correct answer).
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    #[schema(value_type = Vec<String>)]
    pub options: Json<Vec<String>>,
    pub topic: Option<String>,
}

/// Today's published practice set.
#[derive(Debug, Serialize, ToSchema)]
pub struct PracticeSet {
    pub daily_set_id: i64,
    pub questions: Vec<PublicQuestion>,
}
