use std::str::FromStr;

use assess_core::model::{
    Answer, Assessment, AssessmentId, Attempt, AttemptId, QuestionId, QuestionType,
    SubmissionReceipt,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{QuestionRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn assessment_id_from_i64(v: i64) -> Result<AssessmentId, StorageError> {
    u64::try_from(v)
        .map(AssessmentId::new)
        .map_err(|_| StorageError::Serialization("assessment_id sign overflow".into()))
}

pub(crate) fn usize_i64(field: &'static str, v: usize) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn attempt_id_from_str(s: &str) -> Result<AttemptId, StorageError> {
    AttemptId::from_str(s).map_err(ser)
}

pub(crate) fn map_assessment_row(row: &SqliteRow) -> Result<Assessment, StorageError> {
    let id = assessment_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let description: Option<String> = row.try_get("description").map_err(ser)?;
    Assessment::new(id, title, description).map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    let question_type: String = row.try_get("question_type").map_err(ser)?;
    let choices: String = row.try_get("choices").map_err(ser)?;
    Ok(QuestionRecord {
        id: row.try_get("id").map_err(ser)?,
        question_type: QuestionType::from_str(&question_type).map_err(ser)?,
        prompt: row.try_get("prompt").map_err(ser)?,
        order: row.try_get("position").map_err(ser)?,
        choices: serde_json::from_str(&choices).map_err(ser)?,
    })
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<Attempt, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    Ok(Attempt {
        id: attempt_id_from_str(&id)?,
        assessment_id: assessment_id_from_i64(row.try_get::<i64, _>("assessment_id").map_err(ser)?)?,
        started_at: row.try_get("started_at").map_err(ser)?,
    })
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<Answer, StorageError> {
    let question_id: String = row.try_get("question_id").map_err(ser)?;
    Ok(Answer::new(
        QuestionId::new(question_id).map_err(ser)?,
        row.try_get::<String, _>("answer").map_err(ser)?,
    ))
}

pub(crate) fn map_receipt_row(row: &SqliteRow) -> Result<SubmissionReceipt, StorageError> {
    let attempt_id: String = row.try_get("attempt_id").map_err(ser)?;
    let answer_count: i64 = row.try_get("answer_count").map_err(ser)?;
    Ok(SubmissionReceipt {
        id: row.try_get("id").map_err(ser)?,
        attempt_id: attempt_id_from_str(&attempt_id)?,
        submitted_at: row.try_get("submitted_at").map_err(ser)?,
        answer_count: u32::try_from(answer_count)
            .map_err(|_| StorageError::Serialization(format!("invalid answer_count: {answer_count}")))?,
    })
}
