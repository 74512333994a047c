use assess_core::model::{Answer, AttemptId};

use super::SqliteRepository;
use super::mapping::{conn, map_answer_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), StorageError> {
        let attempt = attempt_id.to_string();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let known = sqlx::query("SELECT 1 FROM attempts WHERE id = ?1")
            .bind(&attempt)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?;
        if known.is_none() {
            return Err(StorageError::NotFound);
        }

        for answer in answers {
            // seq is assigned on first insert so reloads keep first-answered order.
            sqlx::query(
                r"
                INSERT INTO progress_answers (attempt_id, question_id, answer, seq)
                VALUES (
                    ?1, ?2, ?3,
                    (SELECT COALESCE(MAX(seq), -1) + 1 FROM progress_answers WHERE attempt_id = ?1)
                )
                ON CONFLICT(attempt_id, question_id) DO UPDATE SET
                    answer = excluded.answer
                ",
            )
            .bind(&attempt)
            .bind(answer.question_id.as_str())
            .bind(&answer.answer)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn load_progress(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT question_id, answer
            FROM progress_answers
            WHERE attempt_id = ?1
            ORDER BY seq ASC
            ",
        )
        .bind(attempt_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_answer_row).collect()
    }
}
