use chrono::{DateTime, Utc};
use std::fmt;

use assess_core::model::{
    AssessmentId, Attempt, AttemptId, Question, QuestionGroups, QuestionId, QuestionType,
};
use assess_core::navigator::{Navigation, Navigator};
use assess_core::store::AnswerStore;

use super::progress::AttemptProgress;
use crate::submission::{ReviewSheet, SubmissionFlow};

//
// ─── ATTEMPT SESSION ───────────────────────────────────────────────────────────
//

/// In-memory state of one attempt.
///
/// Owns the `AnswerStore` for the attempt and the submission state machine.
/// Created by `AssessmentLoopService` and passed explicitly to whatever needs it.
#[derive(Clone)]
pub struct AssessmentService {
    attempt: Attempt,
    store: AnswerStore,
    questions_loaded: bool,
    submission: SubmissionFlow,
}

impl AssessmentService {
    #[must_use]
    pub fn new(attempt: Attempt) -> Self {
        Self {
            attempt,
            store: AnswerStore::new(),
            questions_loaded: false,
            submission: SubmissionFlow::new(),
        }
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt.id
    }

    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.attempt.assessment_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.attempt.started_at
    }

    #[must_use]
    pub fn store(&self) -> &AnswerStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut AnswerStore {
        &mut self.store
    }

    /// True once a question load has happened, even if it returned nothing.
    #[must_use]
    pub fn questions_loaded(&self) -> bool {
        self.questions_loaded
    }

    pub(crate) fn load_questions(&mut self, groups: QuestionGroups) {
        self.store.set_questions(groups);
        self.questions_loaded = true;
    }

    #[must_use]
    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::for_store(&self.store)
    }

    /// What follows `current` in the global order.
    #[must_use]
    pub fn navigate_from(&self, current: Option<&QuestionId>) -> Navigation {
        self.navigator().navigate(current)
    }

    #[must_use]
    pub fn sections(&self) -> Vec<QuestionType> {
        self.navigator().sections()
    }

    #[must_use]
    pub fn section_questions(&self, section: QuestionType) -> Vec<&Question> {
        self.navigator().section_questions(section)
    }

    /// Where a learner re-entering the attempt should land.
    #[must_use]
    pub fn resume_point(&self) -> Option<&Question> {
        self.navigator().first_unanswered(&self.store)
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        let total = self.store.questions().len();
        let answered = self
            .store
            .questions()
            .iter()
            .filter(|q| self.store.is_answered(q.id()))
            .count();
        AttemptProgress {
            total,
            answered,
            remaining: total - answered,
        }
    }

    #[must_use]
    pub fn review(&self) -> ReviewSheet {
        SubmissionFlow::review(self)
    }

    #[must_use]
    pub fn submission(&self) -> &SubmissionFlow {
        &self.submission
    }

    pub fn submission_mut(&mut self) -> &mut SubmissionFlow {
        &mut self.submission
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submission.is_submitted()
    }
}

impl fmt::Debug for AssessmentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssessmentService")
            .field("attempt_id", &self.attempt.id)
            .field("assessment_id", &self.attempt.assessment_id)
            .field("questions_len", &self.store.questions().len())
            .field("answers_len", &self.store.answered_count())
            .field("submission", self.submission.state())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::Answer;
    use assess_core::time::fixed_now;

    fn qid(s: &str) -> QuestionId {
        QuestionId::new(s).unwrap()
    }

    fn session() -> AssessmentService {
        let mut session = AssessmentService::new(Attempt::start(AssessmentId::new(1), fixed_now()));
        session.load_questions(QuestionGroups::from_questions([
            Question::mcq(qid("q1"), "Pick", 1, ["a", "b"]).unwrap(),
            Question::new(qid("q2"), QuestionType::ShortAnswer, "Explain", 2).unwrap(),
            Question::new(qid("q3"), QuestionType::ShortAnswer, "Explain more", 3).unwrap(),
        ]));
        session
    }

    #[test]
    fn progress_counts_only_known_questions() {
        let mut session = session();
        session.store_mut().add_answer(Answer::new(qid("q1"), "a"));
        session.store_mut().add_answer(Answer::new(qid("stray"), "x"));

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 2);
    }

    #[test]
    fn resume_point_is_first_unanswered() {
        let mut session = session();
        assert_eq!(session.resume_point().map(|q| q.id().as_str()), Some("q1"));
        session.store_mut().add_answer(Answer::new(qid("q1"), "a"));
        assert_eq!(session.resume_point().map(|q| q.id().as_str()), Some("q2"));
    }

    #[test]
    fn sections_follow_first_appearance() {
        let session = session();
        assert_eq!(
            session.sections(),
            vec![QuestionType::Mcq, QuestionType::ShortAnswer]
        );
        assert_eq!(session.section_questions(QuestionType::ShortAnswer).len(), 2);
        assert!(session.questions_loaded());
    }
}
