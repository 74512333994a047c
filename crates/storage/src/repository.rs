use async_trait::async_trait;
use chrono::{DateTime, Utc};
use assess_core::model::{
    Answer, Assessment, AssessmentId, Attempt, AttemptId, Question, QuestionGroups, QuestionId,
    QuestionType, SubmissionReceipt,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted/wire shape for a question.
///
/// Mirrors the domain `Question` so adapters can serialize/deserialize
/// without leaking storage concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub prompt: String,
    pub order: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().as_str().to_owned(),
            question_type: question.question_type(),
            prompt: question.prompt().to_owned(),
            order: question.order(),
            choices: question.choices().to_vec(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the record fails domain validation.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let id = QuestionId::new(self.id).map_err(ser)?;
        let question = match self.question_type {
            QuestionType::Mcq => Question::mcq(id, self.prompt, self.order, self.choices),
            other => Question::new(id, other, self.prompt, self.order),
        };
        question.map_err(ser)
    }
}

/// Rebuild validated groups from records, preserving record order.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for invalid records or duplicate ids.
pub fn groups_from_records(
    records: impl IntoIterator<Item = QuestionRecord>,
) -> Result<QuestionGroups, StorageError> {
    let mut questions = Vec::new();
    for record in records {
        questions.push(record.into_question()?);
    }
    let groups = QuestionGroups::from_questions(questions);
    groups.ensure_unique_ids().map_err(ser)?;
    Ok(groups)
}

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Catalog of assessments shown in the list view.
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    /// Persist or update an assessment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the assessment cannot be stored.
    async fn upsert_assessment(&self, assessment: &Assessment) -> Result<(), StorageError>;

    /// Fetch an assessment by id, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn list_assessments(&self, limit: u32) -> Result<Vec<Assessment>, StorageError>;
}

/// The "get questions" collaborator.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Replace every question of an assessment.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` for duplicate ids, or other storage errors.
    async fn replace_questions(
        &self,
        assessment_id: AssessmentId,
        groups: &QuestionGroups,
    ) -> Result<(), StorageError>;

    /// Fetch the grouped questions of an assessment (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_questions(&self, assessment_id: AssessmentId)
    -> Result<QuestionGroups, StorageError>;
}

#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken.
    async fn create_attempt(&self, attempt: &Attempt) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the attempt does not exist.
    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError>;
}

/// The best-effort "save progress" collaborator.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Upsert answers for an attempt, last write wins per question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the attempt is unknown.
    async fn save_progress(&self, attempt_id: AttemptId, answers: &[Answer])
    -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn load_progress(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError>;
}

/// The "submit assessment" collaborator.
#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Record the final answer list of an attempt.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown attempt and
    /// `StorageError::Conflict` if the attempt was already submitted.
    async fn submit(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there is no submission for the attempt.
    async fn get_submission(&self, attempt_id: AttemptId)
    -> Result<SubmissionReceipt, StorageError>;
}

#[derive(Default)]
struct MemoryState {
    assessments: HashMap<AssessmentId, Assessment>,
    questions: HashMap<AssessmentId, QuestionGroups>,
    attempts: HashMap<AttemptId, Attempt>,
    progress: HashMap<AttemptId, Vec<Answer>>,
    submissions: HashMap<AttemptId, (SubmissionReceipt, Vec<Answer>)>,
    next_submission_id: i64,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Answers stored with a submission, for assertions in tests.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the attempt was never submitted.
    pub fn submitted_answers(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        let guard = self.lock()?;
        guard
            .submissions
            .get(&attempt_id)
            .map(|(_, answers)| answers.clone())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl AssessmentRepository for InMemoryRepository {
    async fn upsert_assessment(&self, assessment: &Assessment) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.assessments.insert(assessment.id(), assessment.clone());
        Ok(())
    }

    async fn get_assessment(&self, id: AssessmentId) -> Result<Option<Assessment>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.assessments.get(&id).cloned())
    }

    async fn list_assessments(&self, limit: u32) -> Result<Vec<Assessment>, StorageError> {
        let guard = self.lock()?;
        let mut all: Vec<_> = guard.assessments.values().cloned().collect();
        all.sort_by_key(Assessment::id);
        all.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(all)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn replace_questions(
        &self,
        assessment_id: AssessmentId,
        groups: &QuestionGroups,
    ) -> Result<(), StorageError> {
        groups
            .ensure_unique_ids()
            .map_err(|_| StorageError::Conflict)?;
        let mut guard = self.lock()?;
        guard.questions.insert(assessment_id, groups.clone());
        Ok(())
    }

    async fn get_questions(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<QuestionGroups, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .questions
            .get(&assessment_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn create_attempt(&self, attempt: &Attempt) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.attempts.contains_key(&attempt.id) {
            return Err(StorageError::Conflict);
        }
        guard.attempts.insert(attempt.id, attempt.clone());
        Ok(())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Attempt, StorageError> {
        let guard = self.lock()?;
        guard.attempts.get(&id).cloned().ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.attempts.contains_key(&attempt_id) {
            return Err(StorageError::NotFound);
        }
        let saved = guard.progress.entry(attempt_id).or_default();
        for answer in answers {
            match saved.iter_mut().find(|a| a.question_id == answer.question_id) {
                Some(existing) => existing.answer.clone_from(&answer.answer),
                None => saved.push(answer.clone()),
            }
        }
        Ok(())
    }

    async fn load_progress(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.progress.get(&attempt_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl SubmissionRepository for InMemoryRepository {
    async fn submit(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, StorageError> {
        let mut guard = self.lock()?;
        if !guard.attempts.contains_key(&attempt_id) {
            return Err(StorageError::NotFound);
        }
        if guard.submissions.contains_key(&attempt_id) {
            return Err(StorageError::Conflict);
        }
        guard.next_submission_id += 1;
        let receipt = SubmissionReceipt {
            id: guard.next_submission_id,
            attempt_id,
            submitted_at,
            answer_count: u32::try_from(answers.len())
                .map_err(|_| StorageError::Serialization("too many answers".into()))?,
        };
        guard
            .submissions
            .insert(attempt_id, (receipt.clone(), answers.to_vec()));
        Ok(receipt)
    }

    async fn get_submission(
        &self,
        attempt_id: AttemptId,
    ) -> Result<SubmissionReceipt, StorageError> {
        let guard = self.lock()?;
        guard
            .submissions
            .get(&attempt_id)
            .map(|(receipt, _)| receipt.clone())
            .ok_or(StorageError::NotFound)
    }
}

/// Aggregates the collaborator repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub assessments: Arc<dyn AssessmentRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repo(InMemoryRepository::new())
    }

    /// Share one repository value across every collaborator slot.
    pub fn from_repo<R>(repo: R) -> Self
    where
        R: AssessmentRepository
            + QuestionRepository
            + AttemptRepository
            + ProgressRepository
            + SubmissionRepository
            + Clone
            + 'static,
    {
        Self {
            assessments: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            submissions: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::time::fixed_now;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    async fn repo_with_attempt() -> (InMemoryRepository, AttemptId) {
        let repo = InMemoryRepository::new();
        let attempt = Attempt::start(AssessmentId::new(1), fixed_now());
        repo.create_attempt(&attempt).await.unwrap();
        (repo, attempt.id)
    }

    #[tokio::test]
    async fn progress_upserts_per_question() {
        let (repo, attempt_id) = repo_with_attempt().await;
        repo.save_progress(attempt_id, &[Answer::new(qid("q1"), "a")])
            .await
            .unwrap();
        repo.save_progress(
            attempt_id,
            &[Answer::new(qid("q1"), "b"), Answer::new(qid("q2"), "c")],
        )
        .await
        .unwrap();

        let saved = repo.load_progress(attempt_id).await.unwrap();
        assert_eq!(
            saved,
            vec![Answer::new(qid("q1"), "b"), Answer::new(qid("q2"), "c")]
        );
    }

    #[tokio::test]
    async fn progress_requires_attempt() {
        let repo = InMemoryRepository::new();
        let err = repo
            .save_progress(AttemptId::generate(), &[Answer::new(qid("q1"), "a")])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn second_submission_conflicts() {
        let (repo, attempt_id) = repo_with_attempt().await;
        let answers = [Answer::new(qid("q1"), "a")];
        let receipt = repo.submit(attempt_id, &answers, fixed_now()).await.unwrap();
        assert_eq!(receipt.answer_count, 1);

        let err = repo.submit(attempt_id, &answers, fixed_now()).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
        assert_eq!(repo.submitted_answers(attempt_id).unwrap(), answers.to_vec());
    }

    #[tokio::test]
    async fn questions_round_trip_and_default_to_empty() {
        let repo = InMemoryRepository::new();
        let id = AssessmentId::new(9);
        assert!(repo.get_questions(id).await.unwrap().is_empty());

        let groups = QuestionGroups::from_questions([Question::new(
            qid("q1"),
            QuestionType::Video,
            "Introduce yourself",
            1,
        )
        .unwrap()]);
        repo.replace_questions(id, &groups).await.unwrap();
        assert_eq!(repo.get_questions(id).await.unwrap(), groups);
    }

    #[test]
    fn record_round_trips_mcq() {
        let question = Question::mcq(qid("m1"), "Pick", 3, ["x", "y"]).unwrap();
        let record = QuestionRecord::from_question(&question);
        assert_eq!(record.clone().into_question().unwrap(), question);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "MCQ");
    }

    #[test]
    fn groups_from_records_rejects_duplicates() {
        let record = QuestionRecord {
            id: "dup".into(),
            question_type: QuestionType::ShortAnswer,
            prompt: "Why?".into(),
            order: 1,
            choices: Vec::new(),
        };
        let err = groups_from_records([record.clone(), record]).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
