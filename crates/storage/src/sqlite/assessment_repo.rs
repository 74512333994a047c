use assess_core::model::{Assessment, AssessmentId};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_assessment_row};
use crate::repository::{AssessmentRepository, StorageError};

#[async_trait::async_trait]
impl AssessmentRepository for SqliteRepository {
    async fn upsert_assessment(&self, assessment: &Assessment) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO assessments (id, title, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description
            ",
        )
        .bind(id_i64("assessment_id", assessment.id().value())?)
        .bind(assessment.title().to_owned())
        .bind(assessment.description().map(ToString::to_string))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, StorageError> {
        let row = sqlx::query("SELECT id, title, description FROM assessments WHERE id = ?1")
            .bind(id_i64("assessment_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_assessment_row).transpose()
    }

    async fn list_assessments(&self, limit: u32) -> Result<Vec<Assessment>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description
            FROM assessments
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_assessment_row).collect()
    }
}
