use assess_core::model::{MediaUri, QuestionType, SubmissionReceipt};
use services::{AssessmentService, ReviewItem, SubmissionError};

use crate::vm::{format_datetime, markdown_to_html};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub question_id: String,
    pub section: QuestionType,
    pub section_label: &'static str,
    pub prompt_html: String,
    pub answer_label: String,
    pub answered: bool,
}

/// Confirmation page contents for one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewVm {
    pub rows: Vec<ReviewRowVm>,
    pub answered: usize,
    pub total: usize,
    pub submitting: bool,
    pub submitted: bool,
    pub error: Option<String>,
}

impl ReviewVm {
    #[must_use]
    pub fn from_session(session: &AssessmentService) -> Self {
        let sheet = session.review();
        let submission = session.submission();
        Self {
            rows: sheet.items.iter().map(map_review_row).collect(),
            answered: sheet.answered_count(),
            total: sheet.items.len(),
            submitting: submission.is_submitting(),
            submitted: submission.is_submitted(),
            error: submission.last_error().map(str::to_owned),
        }
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total - self.answered
    }

    /// Shown above the list; submitting with gaps is still allowed.
    #[must_use]
    pub fn unanswered_notice(&self) -> Option<String> {
        match self.unanswered() {
            0 => None,
            1 => Some("1 question is unanswered. You can still submit.".to_string()),
            n => Some(format!("{n} questions are unanswered. You can still submit.")),
        }
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.submitted
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Submitting..."
        } else if self.error.is_some() {
            "Retry submission"
        } else {
            "Submit assessment"
        }
    }
}

/// Toast text once a submit call settles, for success and failure alike.
#[must_use]
pub fn submission_toast(result: &Result<SubmissionReceipt, SubmissionError>) -> String {
    match result {
        Ok(receipt) => format!(
            "Assessment submitted at {} with {} answers.",
            format_datetime(receipt.submitted_at),
            receipt.answer_count
        ),
        Err(err) => format!("{err}. Please try again."),
    }
}

/// Media answers are shown by file name rather than the full upload URI.
#[must_use]
pub fn display_answer(question_type: QuestionType, raw: &str) -> String {
    if question_type.is_media() {
        if let Some(name) = MediaUri::parse(raw).ok().as_ref().and_then(MediaUri::file_name) {
            return name.to_owned();
        }
    }
    raw.to_owned()
}

fn map_review_row(item: &ReviewItem) -> ReviewRowVm {
    let answer_label = item.answer.as_deref().map_or_else(
        || "Not answered".to_string(),
        |raw| display_answer(item.question_type, raw),
    );
    ReviewRowVm {
        question_id: item.question_id.as_str().to_owned(),
        section: item.question_type,
        section_label: item.question_type.label(),
        prompt_html: markdown_to_html(&item.prompt),
        answer_label,
        answered: item.is_answered(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AssessmentId, MediaFile, QuestionId};
    use assess_core::time::fixed_clock;
    use services::{AnswerPayload, AssessmentLoopService};
    use storage::demo::seed_demo;
    use storage::repository::Storage;

    async fn demo() -> (AssessmentLoopService, AssessmentService) {
        let storage = Storage::in_memory();
        seed_demo(&storage, AssessmentId::new(1)).await.unwrap();
        let svc = AssessmentLoopService::from_storage(fixed_clock(), &storage);
        let session = svc.start_attempt(AssessmentId::new(1)).await.unwrap();
        (svc, session)
    }

    #[tokio::test]
    async fn empty_attempt_flags_every_question() {
        let (_, session) = demo().await;
        let vm = ReviewVm::from_session(&session);
        assert_eq!(vm.total, 6);
        assert_eq!(vm.answered, 0);
        assert!(vm.rows.iter().all(|r| r.answer_label == "Not answered"));
        assert_eq!(
            vm.unanswered_notice().as_deref(),
            Some("6 questions are unanswered. You can still submit.")
        );
        assert!(vm.can_submit());
        assert_eq!(vm.submit_label(), "Submit assessment");
    }

    #[tokio::test]
    async fn media_answers_show_file_name() {
        let (_, mut session) = demo().await;
        let qid = QuestionId::new("audio-1").unwrap();
        let file = MediaFile::new("take.mp3", 64).unwrap();
        let uri = MediaUri::for_upload(session.attempt_id(), &qid, &file).unwrap();
        AssessmentLoopService::record_local(&mut session, &qid, AnswerPayload::Media(uri)).unwrap();

        let vm = ReviewVm::from_session(&session);
        let row = vm.rows.iter().find(|r| r.question_id == "audio-1").unwrap();
        assert!(row.answered);
        assert_eq!(row.answer_label, "take.mp3");
        assert_eq!(row.section, QuestionType::Audio);
    }

    #[tokio::test]
    async fn failed_submission_offers_retry() {
        let (_, mut session) = demo().await;
        let flow = session.submission_mut();
        flow.begin().unwrap();
        let result = flow.finish(Err(storage::repository::StorageError::Connection("down".into())));
        assert_eq!(
            submission_toast(&result),
            "Failed to submit assessment. Please try again."
        );

        let vm = ReviewVm::from_session(&session);
        assert_eq!(vm.error.as_deref(), Some("Failed to submit assessment"));
        assert!(vm.can_submit());
        assert_eq!(vm.submit_label(), "Retry submission");
    }

    #[tokio::test]
    async fn successful_submission_toast_names_time_and_count() {
        let (_, mut session) = demo().await;
        let receipt = SubmissionReceipt {
            id: 1,
            attempt_id: session.attempt_id(),
            submitted_at: assess_core::time::fixed_now(),
            answer_count: 3,
        };
        let flow = session.submission_mut();
        flow.begin().unwrap();
        let result = flow.finish(Ok(receipt));
        assert_eq!(
            submission_toast(&result),
            "Assessment submitted at 2023-11-14 22:13 UTC with 3 answers."
        );
    }
}
