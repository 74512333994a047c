use assess_core::model::{AssessmentId, QuestionGroups};

use super::SqliteRepository;
use super::mapping::{conn, id_i64, map_question_row, ser, usize_i64};
use crate::repository::{QuestionRecord, QuestionRepository, StorageError, groups_from_records};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn replace_questions(
        &self,
        assessment_id: AssessmentId,
        groups: &QuestionGroups,
    ) -> Result<(), StorageError> {
        groups
            .ensure_unique_ids()
            .map_err(|_| StorageError::Conflict)?;
        let assessment = id_i64("assessment_id", assessment_id.value())?;

        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM questions WHERE assessment_id = ?1")
            .bind(assessment)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (rank, group) in groups.groups().iter().enumerate() {
            for (seq, question) in group.questions().iter().enumerate() {
                let record = QuestionRecord::from_question(question);
                let choices = serde_json::to_string(&record.choices).map_err(ser)?;
                sqlx::query(
                    r"
                    INSERT INTO questions (
                        assessment_id, id, question_type, prompt, position,
                        group_rank, seq, choices
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ",
                )
                .bind(assessment)
                .bind(record.id)
                .bind(record.question_type.as_tag())
                .bind(record.prompt)
                .bind(record.order)
                .bind(usize_i64("group_rank", rank)?)
                .bind(usize_i64("seq", seq)?)
                .bind(choices)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn get_questions(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<QuestionGroups, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question_type, prompt, position, choices
            FROM questions
            WHERE assessment_id = ?1
            ORDER BY group_rank ASC, seq ASC
            ",
        )
        .bind(id_i64("assessment_id", assessment_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(map_question_row(&row)?);
        }
        groups_from_records(records)
    }
}
