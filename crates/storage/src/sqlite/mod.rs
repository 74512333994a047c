use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{
    AssessmentRepository, AttemptRepository, ProgressRepository, QuestionRepository, Storage,
    SubmissionRepository,
};

mod assessment_repo;
mod attempt_repo;
mod mapping;
mod migrate;
mod progress_repo;
mod question_repo;
mod submission_repo;

/// Applied to every pooled connection. Progress and submission rows cascade
/// from their attempt, which requires foreign keys to be on.
const CONNECTION_PRAGMAS: [&str; 3] = [
    "PRAGMA foreign_keys = ON;",
    "PRAGMA journal_mode = WAL;",
    "PRAGMA busy_timeout = 5000;",
];

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteRepository {
    /// Connect to `SQLite` using the given URL.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the connection cannot be established or if
    /// enforcing foreign key constraints fails during setup.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if migration queries fail.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Build a `Storage` backed by `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if connection or migrations cannot be
    /// completed.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let repo = SqliteRepository::connect(database_url).await?;
        repo.migrate().await?;
        let assessments: Arc<dyn AssessmentRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let submissions: Arc<dyn SubmissionRepository> = Arc::new(repo);
        Ok(Self {
            assessments,
            questions,
            attempts,
            progress,
            submissions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteRepository>();
    }

    #[tokio::test]
    async fn in_memory_storage_enforces_foreign_keys() {
        let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys;")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
