//! Final confirmation step: review sheet and the one-shot submit state machine.

use assess_core::model::{QuestionId, QuestionType, SubmissionReceipt};
use assess_core::navigator::Navigator;
use assess_core::store::AnswerStore;
use storage::repository::StorageError;
use tracing::{info, warn};

use crate::assessment::AssessmentService;
use crate::error::SubmissionError;

//
// ─── REVIEW SHEET ──────────────────────────────────────────────────────────────
//

/// One question/answer pair on the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question_id: QuestionId,
    pub question_type: QuestionType,
    pub prompt: String,
    pub answer: Option<String>,
}

impl ReviewItem {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

/// Every loaded question in global order with its recorded answer, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSheet {
    pub items: Vec<ReviewItem>,
}

impl ReviewSheet {
    #[must_use]
    pub fn from_store(store: &AnswerStore) -> Self {
        let items = Navigator::for_store(store)
            .global_order()
            .iter()
            .map(|q| ReviewItem {
                question_id: q.id().clone(),
                question_type: q.question_type(),
                prompt: q.prompt().to_owned(),
                answer: store.find_answer(q.id()).map(|a| a.answer.clone()),
            })
            .collect();
        Self { items }
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_answered()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.items.len() - self.answered_count()
    }

    pub fn unanswered(&self) -> impl Iterator<Item = &ReviewItem> {
        self.items.iter().filter(|i| !i.is_answered())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unanswered_count() == 0
    }
}

//
// ─── SUBMISSION FLOW ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Ready,
    Submitting,
    Submitted(SubmissionReceipt),
}

/// Guards the submit call of one attempt.
///
/// Submission is always allowed, even with unanswered questions; the review
/// sheet is where gaps are flagged. A failed call returns to `Ready` and keeps
/// the error message until the next attempt. There is no automatic retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFlow {
    state: SubmissionState,
    last_error: Option<String>,
}

impl Default for SubmissionFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionFlow {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Ready,
            last_error: None,
        }
    }

    /// Build the confirmation sheet for an attempt.
    #[must_use]
    pub fn review(session: &AssessmentService) -> ReviewSheet {
        ReviewSheet::from_store(session.store())
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self.state, SubmissionState::Submitted(_))
    }

    #[must_use]
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        match &self.state {
            SubmissionState::Submitted(receipt) => Some(receipt),
            SubmissionState::Ready | SubmissionState::Submitting => None,
        }
    }

    /// Move to `Submitting`.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::InFlight` while a call is outstanding and
    /// `SubmissionError::AlreadySubmitted` once a call has succeeded.
    pub fn begin(&mut self) -> Result<(), SubmissionError> {
        match self.state {
            SubmissionState::Submitting => Err(SubmissionError::InFlight),
            SubmissionState::Submitted(_) => Err(SubmissionError::AlreadySubmitted),
            SubmissionState::Ready => {
                self.state = SubmissionState::Submitting;
                self.last_error = None;
                Ok(())
            }
        }
    }

    /// Settle an outstanding call.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Remote` when the call failed; the flow is
    /// back in `Ready` so a manual retry is possible.
    pub fn finish(
        &mut self,
        result: Result<SubmissionReceipt, StorageError>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        match result {
            Ok(receipt) => {
                info!(
                    attempt_id = %receipt.attempt_id,
                    answers = receipt.answer_count,
                    "assessment submitted"
                );
                self.state = SubmissionState::Submitted(receipt.clone());
                self.last_error = None;
                Ok(receipt)
            }
            Err(err) => {
                warn!(error = %err, "assessment submission failed");
                let err = SubmissionError::Remote(err);
                self.state = SubmissionState::Ready;
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub(crate) fn mark_submitted(&mut self, receipt: SubmissionReceipt) {
        self.state = SubmissionState::Submitted(receipt);
        self.last_error = None;
    }
}
