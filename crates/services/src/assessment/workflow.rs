use std::sync::Arc;

use assess_core::model::{
    Answer, AssessmentId, Attempt, AttemptId, MediaUri, QuestionId, SubmissionReceipt,
};
use assess_core::navigator::Navigation;
use storage::repository::{
    AssessmentRepository, AttemptRepository, ProgressRepository, QuestionRepository, Storage,
    StorageError, SubmissionRepository,
};
use tracing::{debug, info, warn};

use super::service::AssessmentService;
use crate::Clock;
use crate::error::{AssessmentError, SubmissionError};

/// Raw input collected by a section page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerPayload {
    /// Selected choice or typed text.
    Text(String),
    /// Location of an uploaded recording.
    Media(MediaUri),
}

/// Result of mirroring answers to the save-progress collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// The local answer is kept; the message is shown as a warning.
    Failed(String),
}

impl SaveStatus {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }

    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match self {
            SaveStatus::Saved => None,
            SaveStatus::Failed(message) => Some(message),
        }
    }
}

/// Result of answering a single question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub answer: Answer,
    pub navigation: Navigation,
    pub save: SaveStatus,
}

/// Orchestrates attempt start/resume, answering, progress saves and submission.
#[derive(Clone)]
pub struct AssessmentLoopService {
    clock: Clock,
    assessments: Arc<dyn AssessmentRepository>,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    progress: Arc<dyn ProgressRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl AssessmentLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        assessments: Arc<dyn AssessmentRepository>,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        progress: Arc<dyn ProgressRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            clock,
            assessments,
            questions,
            attempts,
            progress,
            submissions,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(
            clock,
            Arc::clone(&storage.assessments),
            Arc::clone(&storage.questions),
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.submissions),
        )
    }

    /// Create a new attempt and load its questions.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::NotFound` for an unknown assessment, or
    /// storage/validation errors from the load.
    pub async fn start_attempt(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<AssessmentService, AssessmentError> {
        if self.assessments.get_assessment(assessment_id).await?.is_none() {
            return Err(AssessmentError::NotFound(assessment_id));
        }

        let attempt = Attempt::start(assessment_id, self.clock.now());
        self.attempts.create_attempt(&attempt).await?;

        let mut session = AssessmentService::new(attempt);
        self.ensure_questions(&mut session).await?;
        info!(
            attempt_id = %session.attempt_id(),
            assessment_id = %assessment_id,
            questions = session.store().questions().len(),
            "attempt started"
        );
        Ok(session)
    }

    /// Load questions if the store has none yet.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` if the load fails or the set has duplicate ids.
    pub async fn ensure_questions(
        &self,
        session: &mut AssessmentService,
    ) -> Result<(), AssessmentError> {
        if session.store().has_questions() {
            return Ok(());
        }
        let groups = self.questions.get_questions(session.assessment_id()).await?;
        groups.ensure_unique_ids()?;
        if groups.is_empty() {
            debug!(assessment_id = %session.assessment_id(), "assessment has no questions");
        }
        session.load_questions(groups);
        Ok(())
    }

    /// Rebuild an attempt from storage, restoring saved answers.
    ///
    /// Saved answers for questions no longer in the assessment are dropped.
    /// A failed progress load is logged and the attempt resumes empty.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError::Storage` if the attempt is unknown.
    pub async fn resume_attempt(
        &self,
        attempt_id: AttemptId,
    ) -> Result<AssessmentService, AssessmentError> {
        let attempt = self.attempts.get_attempt(attempt_id).await?;
        let mut session = AssessmentService::new(attempt);
        self.ensure_questions(&mut session).await?;

        match self.progress.load_progress(attempt_id).await {
            Ok(saved) => {
                let known: Vec<Answer> = saved
                    .into_iter()
                    .filter(|a| session.store().find_question(&a.question_id).is_some())
                    .collect();
                debug!(attempt_id = %attempt_id, restored = known.len(), "progress restored");
                session.store_mut().restore_answers(known);
            }
            Err(err) => warn!(attempt_id = %attempt_id, error = %err, "could not load progress"),
        }

        match self.submissions.get_submission(attempt_id).await {
            Ok(receipt) => session.submission_mut().mark_submitted(receipt),
            Err(StorageError::NotFound) => {}
            Err(err) => warn!(attempt_id = %attempt_id, error = %err, "could not check submission"),
        }

        Ok(session)
    }

    /// Validate and store an answer locally, then compute where to go next.
    ///
    /// Runs before any remote call, so validation errors never reach the network.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` for unknown questions, mismatched payloads,
    /// invalid answers, or a submitted attempt.
    pub fn record_local(
        session: &mut AssessmentService,
        question_id: &QuestionId,
        payload: AnswerPayload,
    ) -> Result<(Answer, Navigation), AssessmentError> {
        if session.is_submitted() {
            return Err(AssessmentError::AlreadySubmitted);
        }
        let question = session
            .store()
            .find_question(question_id)
            .ok_or_else(|| AssessmentError::UnknownQuestion(question_id.clone()))?;

        let answer = match (payload, question.question_type().is_media()) {
            (AnswerPayload::Text(raw), false) => Answer::for_question(question, raw)?,
            (AnswerPayload::Media(uri), true) => Answer::new(question.id().clone(), uri.to_string()),
            _ => {
                return Err(AssessmentError::PayloadMismatch {
                    question_type: question.question_type(),
                });
            }
        };

        session.store_mut().add_answer(answer.clone());
        let navigation = session.navigate_from(Some(question_id));
        Ok((answer, navigation))
    }

    /// Record an answer and mirror the attempt's answers to saved progress.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` from local validation only. A failed save is
    /// reported through `AnswerOutcome::save`.
    pub async fn record_answer(
        &self,
        session: &mut AssessmentService,
        question_id: &QuestionId,
        payload: AnswerPayload,
    ) -> Result<AnswerOutcome, AssessmentError> {
        let (answer, navigation) = Self::record_local(session, question_id, payload)?;
        let save = self
            .save_progress(session.attempt_id(), session.store().answers())
            .await;
        Ok(AnswerOutcome {
            answer,
            navigation,
            save,
        })
    }

    /// Best-effort progress save. Never fails; the result says what happened.
    pub async fn save_progress(&self, attempt_id: AttemptId, answers: &[Answer]) -> SaveStatus {
        match self.progress.save_progress(attempt_id, answers).await {
            Ok(()) => {
                debug!(attempt_id = %attempt_id, answers = answers.len(), "progress saved");
                SaveStatus::Saved
            }
            Err(err) => {
                warn!(attempt_id = %attempt_id, error = %err, "progress save failed");
                SaveStatus::Failed(
                    "Your answer is kept on this device but could not be saved yet.".to_string(),
                )
            }
        }
    }

    /// Submit the full answer list of an attempt.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InFlight`/`AlreadySubmitted` from the guard,
    /// or `SubmissionError::Remote` when the call fails.
    pub async fn submit(
        &self,
        session: &mut AssessmentService,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        session.submission_mut().begin()?;
        let answers = session.store().answers().to_vec();
        let result = self.send_submission(session.attempt_id(), &answers).await;
        session.submission_mut().finish(result)
    }

    /// Raw submit call, for callers that drive `SubmissionFlow` themselves.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` from the submission collaborator.
    pub async fn send_submission(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<SubmissionReceipt, StorageError> {
        debug!(attempt_id = %attempt_id, answers = answers.len(), "submitting assessment");
        self.submissions
            .submit(attempt_id, answers, self.clock.now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AttemptId, MediaFile, QuestionType};
    use assess_core::time::fixed_clock;
    use storage::demo::seed_demo;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    async fn seeded() -> (AssessmentLoopService, Storage) {
        let storage = Storage::in_memory();
        seed_demo(&storage, AssessmentId::new(1)).await.unwrap();
        (AssessmentLoopService::from_storage(fixed_clock(), &storage), storage)
    }

    #[tokio::test]
    async fn unknown_assessment_is_not_found() {
        let (svc, _) = seeded().await;
        let err = svc.start_attempt(AssessmentId::new(404)).await.unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));
    }

    #[tokio::test]
    async fn text_payload_is_rejected_for_media_question() {
        let (svc, _) = seeded().await;
        let mut session = svc.start_attempt(AssessmentId::new(1)).await.unwrap();
        let err = AssessmentLoopService::record_local(
            &mut session,
            &qid("audio-1"),
            AnswerPayload::Text("hello".into()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::PayloadMismatch {
                question_type: QuestionType::Audio
            }
        ));
        assert_eq!(session.store().answered_count(), 0);
    }

    #[tokio::test]
    async fn media_payload_stores_uri() {
        let (svc, _) = seeded().await;
        let mut session = svc.start_attempt(AssessmentId::new(1)).await.unwrap();
        let file = MediaFile::new("take.mp3", 1_024).unwrap();
        let uri = MediaUri::for_upload(session.attempt_id(), &qid("audio-1"), &file).unwrap();

        let outcome = svc
            .record_answer(&mut session, &qid("audio-1"), AnswerPayload::Media(uri.clone()))
            .await
            .unwrap();
        assert_eq!(outcome.answer.answer, uri.to_string());
        assert_eq!(outcome.navigation, Navigation::NextSection(QuestionType::Mcq));
        assert!(outcome.save.is_saved());
    }

    #[tokio::test]
    async fn resume_restores_saved_answers_and_submission() {
        let (svc, _) = seeded().await;
        let mut session = svc.start_attempt(AssessmentId::new(1)).await.unwrap();
        svc.record_answer(&mut session, &qid("mcq-1"), AnswerPayload::Text("let".into()))
            .await
            .unwrap();

        let resumed = svc.resume_attempt(session.attempt_id()).await.unwrap();
        assert_eq!(resumed.store().answers(), session.store().answers());
        assert_eq!(resumed.resume_point().map(|q| q.id().as_str()), Some("short-1"));
        assert!(!resumed.is_submitted());

        svc.submit(&mut session).await.unwrap();
        let resumed = svc.resume_attempt(session.attempt_id()).await.unwrap();
        assert!(resumed.is_submitted());
    }

    #[tokio::test]
    async fn resume_unknown_attempt_fails() {
        let (svc, _) = seeded().await;
        let err = svc.resume_attempt(AttemptId::generate()).await.unwrap_err();
        assert!(matches!(err, AssessmentError::Storage(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn answers_are_rejected_after_submission() {
        let (svc, _) = seeded().await;
        let mut session = svc.start_attempt(AssessmentId::new(1)).await.unwrap();
        svc.submit(&mut session).await.unwrap();

        let err = svc
            .record_answer(&mut session, &qid("mcq-1"), AnswerPayload::Text("let".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::AlreadySubmitted));
    }
}
