use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs the versioned migrations for the current schema.
///
/// Version 1 creates assessments, questions, attempts, saved progress and submissions.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS assessments (
                    id INTEGER PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        // group_rank keeps group declaration order, seq keeps position within a group.
        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    assessment_id INTEGER NOT NULL,
                    id TEXT NOT NULL,
                    question_type TEXT NOT NULL
                        CHECK (question_type IN ('MCQ', 'SHORT_ANSWER', 'AUDIO', 'VIDEO')),
                    prompt TEXT NOT NULL,
                    position INTEGER NOT NULL,
                    group_rank INTEGER NOT NULL CHECK (group_rank >= 0),
                    seq INTEGER NOT NULL CHECK (seq >= 0),
                    choices TEXT NOT NULL DEFAULT '[]',
                    PRIMARY KEY (assessment_id, id),
                    FOREIGN KEY (assessment_id) REFERENCES assessments(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS attempts (
                    id TEXT PRIMARY KEY,
                    assessment_id INTEGER NOT NULL,
                    started_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS progress_answers (
                    attempt_id TEXT NOT NULL,
                    question_id TEXT NOT NULL,
                    answer TEXT NOT NULL,
                    seq INTEGER NOT NULL,
                    PRIMARY KEY (attempt_id, question_id),
                    FOREIGN KEY (attempt_id) REFERENCES attempts(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS submissions (
                    id INTEGER PRIMARY KEY,
                    attempt_id TEXT NOT NULL UNIQUE,
                    submitted_at TEXT NOT NULL,
                    answer_count INTEGER NOT NULL CHECK (answer_count >= 0),
                    FOREIGN KEY (attempt_id) REFERENCES attempts(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS submission_answers (
                    submission_id INTEGER NOT NULL,
                    question_id TEXT NOT NULL,
                    answer TEXT NOT NULL,
                    seq INTEGER NOT NULL,
                    PRIMARY KEY (submission_id, question_id),
                    FOREIGN KEY (submission_id) REFERENCES submissions(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_questions_assessment_order
                    ON questions (assessment_id, group_rank, seq);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_attempts_assessment_started
                    ON attempts (assessment_id, started_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteRepository;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let repo = SqliteRepository::connect("sqlite:file:memdb_migrate_twice?mode=memory&cache=shared")
            .await
            .expect("connect");
        run_migrations(repo.pool()).await.expect("first run");
        run_migrations(repo.pool()).await.expect("second run");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
            .fetch_one(repo.pool())
            .await
            .expect("count");
        assert_eq!(count, 1);
    }
}
