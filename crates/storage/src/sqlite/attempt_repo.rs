use assess_core::model::{Attempt, AttemptId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_attempt_row};
use crate::repository::{AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn create_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO attempts (id, assessment_id, started_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(attempt.id.to_string())
        .bind(id_i64("assessment_id", attempt.assessment_id.value())?)
        .bind(attempt.started_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError> {
        let row = sqlx::query("SELECT id, assessment_id, started_at FROM attempts WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?
            .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }
}
