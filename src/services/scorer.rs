// src/services/scorer.rs

use std::collections::{HashMap, HashSet};

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerOutcome, AttemptResult, SubmittedAnswer},
        question::QuestionSet,
    },
};

pub fn ensure_non_empty(answers: &[SubmittedAnswer]) -> Result<(), AppError> {
    if answers.is_empty() {
        return Err(AppError::EmptySubmission);
    }
    Ok(())
}

/// Scores a submission against a resolved set.
///
/// Validation is all-or-nothing: one answer for a question outside the set,
/// or a second answer for the same question, rejects the whole batch.
/// Answers are compared by exact string equality, and the total is the size
/// of the set, so skipped questions count as wrong.
pub fn score(
    question_set: &QuestionSet,
    answers: &[SubmittedAnswer],
) -> Result<AttemptResult, AppError> {
    ensure_non_empty(answers)?;

    let answer_key: HashMap<i64, &str> = question_set
        .questions
        .iter()
        .map(|q| (q.question_id, q.correct_answer.as_str()))
        .collect();

    let mut answered = HashSet::with_capacity(answers.len());
    let outcomes = answers
        .iter()
        .map(|ans| -> Result<AnswerOutcome, AppError> {
            let correct = answer_key
                .get(&ans.question_id)
                .ok_or(AppError::UnknownQuestion(ans.question_id))?;
            if !answered.insert(ans.question_id) {
                return Err(AppError::DuplicateAnswer(ans.question_id));
            }

            Ok(AnswerOutcome {
                question_id: ans.question_id,
                selected_answer: ans.selected_answer.clone(),
                // Case-sensitive, untrimmed
                is_correct: ans.selected_answer == *correct,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let correct_count = outcomes.iter().filter(|o| o.is_correct).count() as i64;

    Ok(AttemptResult {
        total_questions: answer_key.len() as i64,
        correct_count,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionRef;

    fn two_question_set() -> QuestionSet {
        QuestionSet {
            set_id: 1,
            questions: vec![QuestionRef::new(1, "A"), QuestionRef::new(2, "B")],
        }
    }

    #[test]
    fn test_score_half() {
        let answers = vec![SubmittedAnswer::new(1, "A"), SubmittedAnswer::new(2, "C")];

        let result = score(&two_question_set(), &answers).unwrap();
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.correct_count, 1);
        assert!(result.outcomes[0].is_correct);
        assert!(!result.outcomes[1].is_correct);
    }

    #[test]
    fn test_score_unknown_question_rejects_batch() {
        let answers = vec![SubmittedAnswer::new(1, "A"), SubmittedAnswer::new(9, "X")];

        let err = score(&two_question_set(), &answers).unwrap_err();
        assert!(matches!(err, AppError::UnknownQuestion(9)));
    }

    #[test]
    fn test_score_empty_submission() {
        assert!(matches!(
            score(&two_question_set(), &[]),
            Err(AppError::EmptySubmission)
        ));
    }

    #[test]
    fn test_score_is_strict() {
        let set = QuestionSet {
            set_id: 1,
            questions: vec![QuestionRef::new(1, "Paris")],
        };

        for wrong in ["paris", " Paris", "Paris ", "PARIS"] {
            let result = score(&set, &[SubmittedAnswer::new(1, wrong)]).unwrap();
            assert_eq!(result.correct_count, 0, "{:?} should not match", wrong);
        }
        let result = score(&set, &[SubmittedAnswer::new(1, "Paris")]).unwrap();
        assert_eq!(result.correct_count, 1);
    }

    #[test]
    fn test_score_skipped_questions_count_toward_total() {
        let set = QuestionSet {
            set_id: 1,
            questions: (1..=5).map(|i| QuestionRef::new(i, "A")).collect(),
        };

        let result = score(&set, &[SubmittedAnswer::new(3, "A")]).unwrap();
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.outcomes.len(), 1);
    }

    #[test]
    fn test_score_keeps_submission_order() {
        let answers = vec![SubmittedAnswer::new(2, "B"), SubmittedAnswer::new(1, "A")];

        let result = score(&two_question_set(), &answers).unwrap();
        let ids: Vec<i64> = result.outcomes.iter().map(|o| o.question_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_score_is_deterministic() {
        let answers = vec![SubmittedAnswer::new(2, "B"), SubmittedAnswer::new(1, "D")];

        let first = score(&two_question_set(), &answers).unwrap();
        let second = score(&two_question_set(), &answers).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_score_repeated_answer_rejects_batch() {
        let answers: Vec<SubmittedAnswer> = (0..10).map(|_| SubmittedAnswer::new(1, "A")).collect();

        let err = score(&two_question_set(), &answers).unwrap_err();
        assert!(matches!(err, AppError::DuplicateAnswer(1)));
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let set = QuestionSet {
            set_id: 1,
            questions: (1..=4).map(|i| QuestionRef::new(i, "A")).collect(),
        };
        let picks = ["A", "B", "a", "A"];

        for n in 1..=4 {
            let answers: Vec<SubmittedAnswer> = (1..=n)
                .map(|i| SubmittedAnswer::new(i, picks[(i - 1) as usize]))
                .collect();
            let result = score(&set, &answers).unwrap();
            assert!(0 <= result.correct_count && result.correct_count <= result.total_questions);
        }
    }
}
