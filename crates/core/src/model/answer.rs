use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("Please enter an answer before continuing.")]
    Empty,

    #[error("\"{0}\" is not one of the available choices.")]
    UnknownChoice(String),
}

/// Recorded response to one question. The payload is opaque to the store:
/// typed text, the selected choice, or an uploaded media URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "questionId")]
    pub question_id: QuestionId,
    pub answer: String,
}

impl Answer {
    #[must_use]
    pub fn new(question_id: QuestionId, answer: impl Into<String>) -> Self {
        Self {
            question_id,
            answer: answer.into(),
        }
    }

    /// Validate a raw response against the question it answers.
    ///
    /// Runs before anything is recorded or sent remotely.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::Empty` for blank input and
    /// `AnswerError::UnknownChoice` when an MCQ response is not a listed choice.
    pub fn for_question(question: &Question, raw: impl Into<String>) -> Result<Self, AnswerError> {
        let raw = raw.into();
        let value = raw.trim();
        if value.is_empty() {
            return Err(AnswerError::Empty);
        }
        if !question.choices().is_empty() && !question.choices().iter().any(|c| c == value) {
            return Err(AnswerError::UnknownChoice(value.to_string()));
        }
        Ok(Self::new(question.id().clone(), raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::QuestionType;

    fn mcq() -> Question {
        Question::mcq(QuestionId::new("q1").unwrap(), "Capital of France?", 1, ["Paris", "Rome"])
            .unwrap()
    }

    #[test]
    fn accepts_listed_choice() {
        let answer = Answer::for_question(&mcq(), "Paris").unwrap();
        assert_eq!(answer.answer, "Paris");
    }

    #[test]
    fn rejects_unlisted_choice() {
        let err = Answer::for_question(&mcq(), "Berlin").unwrap_err();
        assert_eq!(err, AnswerError::UnknownChoice("Berlin".into()));
    }

    #[test]
    fn rejects_blank_text() {
        let question = Question::new(
            QuestionId::new("q2").unwrap(),
            QuestionType::ShortAnswer,
            "Explain",
            2,
        )
        .unwrap();
        assert_eq!(Answer::for_question(&question, " \n").unwrap_err(), AnswerError::Empty);
    }

    #[test]
    fn text_is_stored_as_typed() {
        let question = Question::new(
            QuestionId::new("q3").unwrap(),
            QuestionType::ShortAnswer,
            "Explain",
            3,
        )
        .unwrap();
        let typed = "  Ownership moves values.\n\nBorrowing does not.\n";
        let answer = Answer::for_question(&question, typed).unwrap();
        assert_eq!(answer.answer, typed);
    }

    #[test]
    fn serializes_with_camel_case_question_id() {
        let answer = Answer::new(QuestionId::new("q3").unwrap(), "hello");
        let json = serde_json::to_string(&answer).unwrap();
        assert_eq!(json, r#"{"questionId":"q3","answer":"hello"}"#);
    }
}
