use thiserror::Error;

use crate::model::{AnswerError, AssessmentError, MediaValidationError, QuestionError};

/// Umbrella for domain validation failures.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    MediaValidation(#[from] MediaValidationError),
    #[error(transparent)]
    Question(#[from] QuestionError),
}
