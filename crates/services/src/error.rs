//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::{
    AnswerError, AssessmentId, MediaValidationError, QuestionError, QuestionId, QuestionType,
};
use storage::demo::DemoError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted while running an attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment {0} was not found")]
    NotFound(AssessmentId),
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(QuestionId),
    #[error("{} questions take a different kind of answer", .question_type.label())]
    PayloadMismatch { question_type: QuestionType },
    #[error("this attempt has already been submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Answer(#[from] AnswerError),
    #[error(transparent)]
    Media(#[from] MediaValidationError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SubmissionFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("a submission is already in progress")]
    InFlight,
    #[error("this attempt has already been submitted")]
    AlreadySubmitted,
    #[error("Failed to submit assessment")]
    Remote(#[source] StorageError),
}

/// Errors emitted by the upload simulator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    #[error(transparent)]
    Invalid(#[from] MediaValidationError),
    #[error("could not read the selected file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by the HTTP backend before they are folded into `StorageError`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("invalid API base URL: {0}")]
    BaseUrl(String),
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<RemoteError> for StorageError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::HttpStatus(status) if status == reqwest::StatusCode::NOT_FOUND => {
                StorageError::NotFound
            }
            RemoteError::HttpStatus(status) if status == reqwest::StatusCode::CONFLICT => {
                StorageError::Conflict
            }
            RemoteError::Http(e) if e.is_decode() => StorageError::Serialization(e.to_string()),
            other => StorageError::Connection(other.to_string()),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Demo(#[from] DemoError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
