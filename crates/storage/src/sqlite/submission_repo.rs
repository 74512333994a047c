use assess_core::model::{Answer, AttemptId, SubmissionReceipt};
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::{conn, map_receipt_row, usize_i64};
use crate::repository::{StorageError, SubmissionRepository};

#[async_trait::async_trait]
impl SubmissionRepository for SqliteRepository {
    async fn submit(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, StorageError> {
        let attempt = attempt_id.to_string();
        let answer_count = u32::try_from(answers.len())
            .map_err(|_| StorageError::Serialization("too many answers".into()))?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        let known = sqlx::query("SELECT 1 FROM attempts WHERE id = ?1")
            .bind(&attempt)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if known.is_none() {
            return Err(StorageError::NotFound);
        }

        let res = sqlx::query(
            r"
            INSERT INTO submissions (attempt_id, submitted_at, answer_count)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(attempt_id) DO NOTHING
            ",
        )
        .bind(&attempt)
        .bind(submitted_at)
        .bind(i64::from(answer_count))
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        let submission_id = res.last_insert_rowid();

        for (seq, answer) in answers.iter().enumerate() {
            sqlx::query(
                r"
                INSERT INTO submission_answers (submission_id, question_id, answer, seq)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(submission_id, question_id) DO UPDATE SET
                    answer = excluded.answer
                ",
            )
            .bind(submission_id)
            .bind(answer.question_id.as_str())
            .bind(&answer.answer)
            .bind(usize_i64("seq", seq)?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;

        Ok(SubmissionReceipt {
            id: submission_id,
            attempt_id,
            submitted_at,
            answer_count,
        })
    }

    async fn get_submission(
        &self,
        attempt_id: AttemptId,
    ) -> Result<SubmissionReceipt, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, attempt_id, submitted_at, answer_count
            FROM submissions
            WHERE attempt_id = ?1
            ",
        )
        .bind(attempt_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_receipt_row(&row)
    }
}
