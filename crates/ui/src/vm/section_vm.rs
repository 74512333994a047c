use std::path::PathBuf;

use assess_core::model::{MediaValidationError, QuestionId, QuestionType};
use assess_core::navigator::Navigation;
use services::{AssessmentService, UploadProgress};

use crate::vm::markdown_to_html;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionPhase {
    Idle,
    Submitting,
    Saved,
}

/// A question addressed by its section and its position within that section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionSlot {
    pub section: QuestionType,
    pub index: usize,
}

impl QuestionSlot {
    /// Slot of the question that follows `current` in the global order.
    #[must_use]
    pub fn after(session: &AssessmentService, current: &QuestionId) -> Option<Self> {
        let next = session.navigator().next_question(current)?;
        let section = next.question_type();
        let index = session
            .section_questions(section)
            .iter()
            .position(|q| q.id() == next.id())?;
        Some(Self { section, index })
    }
}

/// What the page does after an answer is saved or an answered question is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionStep {
    Stay,
    NextQuestion,
    Section(QuestionType),
    Review,
}

/// Input collected for the current question, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionInput {
    Text(String),
    MediaPath(PathBuf),
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub question_type: QuestionType,
    pub prompt_html: String,
    pub choices: Vec<String>,
    pub stored_answer: Option<String>,
    /// Zero-based index within the section.
    pub index: usize,
    pub section_len: usize,
}

impl QuestionVm {
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.stored_answer.is_some()
    }

    #[must_use]
    pub fn position_label(&self) -> String {
        format!("Question {} of {}", self.index + 1, self.section_len)
    }
}

/// Local state of one section page.
#[derive(Clone, Debug, PartialEq)]
pub struct SectionVm {
    section: QuestionType,
    index: Option<usize>,
    phase: SectionPhase,
    draft: String,
    media_path: String,
    upload: Option<UploadProgress>,
    error: Option<String>,
}

impl SectionVm {
    #[must_use]
    pub fn new(section: QuestionType) -> Self {
        Self {
            section,
            index: None,
            phase: SectionPhase::Idle,
            draft: String::new(),
            media_path: String::new(),
            upload: None,
            error: None,
        }
    }

    /// Page state opened directly on one question.
    #[must_use]
    pub fn at(slot: QuestionSlot) -> Self {
        Self {
            index: Some(slot.index),
            ..Self::new(slot.section)
        }
    }

    #[must_use]
    pub fn section(&self) -> QuestionType {
        self.section
    }

    #[must_use]
    pub fn phase(&self) -> SectionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.phase == SectionPhase::Submitting
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[must_use]
    pub fn media_path(&self) -> &str {
        &self.media_path
    }

    #[must_use]
    pub fn upload_progress(&self) -> Option<UploadProgress> {
        self.upload
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Index of the question on screen. Pages reached through the navigator
    /// carry the position it chose; a page opened from a link starts on the
    /// first unanswered question of the section.
    #[must_use]
    pub fn current_index(&self, session: &AssessmentService) -> Option<usize> {
        let questions = session.section_questions(self.section);
        if questions.is_empty() {
            return None;
        }
        match self.index {
            Some(index) => (index < questions.len()).then_some(index),
            None => Some(
                questions
                    .iter()
                    .position(|q| !session.store().is_answered(q.id()))
                    .unwrap_or(0),
            ),
        }
    }

    #[must_use]
    pub fn current_question(&self, session: &AssessmentService) -> Option<QuestionVm> {
        let index = self.current_index(session)?;
        let questions = session.section_questions(self.section);
        let question = questions.get(index)?;
        Some(QuestionVm {
            id: question.id().clone(),
            question_type: question.question_type(),
            prompt_html: markdown_to_html(question.prompt()),
            choices: question.choices().to_vec(),
            stored_answer: session
                .store()
                .find_answer(question.id())
                .map(|a| a.answer.clone()),
            index,
            section_len: questions.len(),
        })
    }

    pub fn set_draft(&mut self, value: String) {
        if self.is_submitting() {
            return;
        }
        self.draft = value;
        self.error = None;
    }

    pub fn set_media_path(&mut self, value: String) {
        if self.is_submitting() {
            return;
        }
        self.media_path = value;
        self.error = None;
    }

    /// Input for a question of `question_type`. Media answers need a file path.
    ///
    /// # Errors
    ///
    /// Returns the inline message when no file was chosen for a media question.
    pub fn input_for(&self, question_type: QuestionType) -> Result<SectionInput, String> {
        if question_type.is_media() {
            let path = self.media_path.trim();
            if path.is_empty() {
                return Err(MediaValidationError::MissingFile.to_string());
            }
            Ok(SectionInput::MediaPath(PathBuf::from(path)))
        } else {
            Ok(SectionInput::Text(self.draft.clone()))
        }
    }

    /// Enter `Submitting`. Returns `false` while a submit is already running.
    pub fn begin_submit(&mut self) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.phase = SectionPhase::Submitting;
        self.upload = None;
        self.error = None;
        true
    }

    /// Progress never moves backwards within one upload.
    pub fn set_upload_progress(&mut self, progress: UploadProgress) {
        if self.upload.is_none_or(|current| progress >= current) {
            self.upload = Some(progress);
        }
    }

    /// Back to `Idle` with an inline error; the typed input is kept.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.phase = SectionPhase::Idle;
        self.upload = None;
        self.error = Some(message.into());
    }

    /// The answer was recorded. Clears the input and follows the navigator to `next`.
    pub fn saved(&mut self, navigation: Navigation, next: Option<QuestionSlot>) -> SectionStep {
        self.phase = SectionPhase::Saved;
        self.draft.clear();
        self.media_path.clear();
        self.upload = None;
        self.error = None;
        self.step(navigation, next)
    }

    /// Move past an already answered question without touching its answer.
    pub fn skip(&mut self, navigation: Navigation, next: Option<QuestionSlot>) -> SectionStep {
        self.error = None;
        self.step(navigation, next)
    }

    fn step(&mut self, navigation: Navigation, next: Option<QuestionSlot>) -> SectionStep {
        match navigation {
            Navigation::NextSection(section) => {
                let slot = next.filter(|slot| slot.section == section);
                if section == self.section {
                    self.index = slot.map(|slot| slot.index);
                    self.phase = SectionPhase::Idle;
                    SectionStep::NextQuestion
                } else {
                    // The next page picks this state up instead of starting fresh.
                    *self = slot.map_or_else(|| Self::new(section), Self::at);
                    SectionStep::Section(section)
                }
            }
            Navigation::Complete => SectionStep::Review,
            Navigation::Unresolved => SectionStep::Stay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{AssessmentId, MediaFile, MediaUri};
    use assess_core::time::fixed_clock;
    use services::{AnswerPayload, AssessmentLoopService};
    use storage::demo::seed_demo;
    use storage::repository::Storage;

    async fn demo_session() -> AssessmentService {
        let storage = Storage::in_memory();
        seed_demo(&storage, AssessmentId::new(1)).await.unwrap();
        AssessmentLoopService::from_storage(fixed_clock(), &storage)
            .start_attempt(AssessmentId::new(1))
            .await
            .unwrap()
    }

    fn answer(session: &mut AssessmentService, id: &str, value: &str) -> Navigation {
        let id = QuestionId::new(id).unwrap();
        AssessmentLoopService::record_local(session, &id, AnswerPayload::Text(value.into()))
            .unwrap()
            .1
    }

    /// Answer with a payload that fits the question type.
    fn answer_any(session: &mut AssessmentService, id: &QuestionId) -> Navigation {
        let question = session.store().find_question(id).unwrap().clone();
        let payload = match question.question_type() {
            QuestionType::Mcq => AnswerPayload::Text(question.choices()[0].clone()),
            QuestionType::ShortAnswer => AnswerPayload::Text(format!("answer for {id}")),
            QuestionType::Audio | QuestionType::Video => {
                let name = if question.question_type() == QuestionType::Audio {
                    "take.mp3"
                } else {
                    "take.mp4"
                };
                let file = MediaFile::new(name, 64).unwrap();
                AnswerPayload::Media(
                    MediaUri::for_upload(session.attempt_id(), id, &file).unwrap(),
                )
            }
        };
        AssessmentLoopService::record_local(session, id, payload).unwrap().1
    }

    #[tokio::test]
    async fn opens_on_first_unanswered_question_of_section() {
        let mut session = demo_session().await;
        let vm = SectionVm::new(QuestionType::Mcq);
        assert_eq!(
            vm.current_question(&session).map(|q| q.id.as_str().to_owned()),
            Some("mcq-1".to_owned())
        );

        let first_choice = session.section_questions(QuestionType::Mcq)[0].choices()[0].clone();
        answer(&mut session, "mcq-1", &first_choice);
        let question = vm.current_question(&session).unwrap();
        assert_eq!(question.id.as_str(), "mcq-2");
        assert_eq!(question.position_label(), "Question 2 of 2");
        assert!(!question.is_answered());
    }

    #[tokio::test]
    async fn answered_question_exposes_stored_answer() {
        let mut session = demo_session().await;
        answer(&mut session, "short-1", "Ownership moves the value.");
        answer(&mut session, "short-2", "A borrow.");

        let vm = SectionVm::new(QuestionType::ShortAnswer);
        let question = vm.current_question(&session).unwrap();
        assert_eq!(question.index, 0);
        assert_eq!(question.stored_answer.as_deref(), Some("Ownership moves the value."));
    }

    #[tokio::test]
    async fn empty_section_has_no_question() {
        let session = demo_session().await;
        let mut vm = SectionVm::new(QuestionType::Video);
        assert!(vm.current_question(&session).is_some());
        vm.index = Some(5);
        assert!(vm.current_question(&session).is_none());
    }

    #[test]
    fn submit_is_guarded_while_in_flight() {
        let mut vm = SectionVm::new(QuestionType::ShortAnswer);
        vm.set_draft("draft".into());
        assert!(vm.begin_submit());
        assert!(!vm.begin_submit());

        vm.set_draft("changed while busy".into());
        assert_eq!(vm.draft(), "draft");
    }

    #[test]
    fn upload_progress_never_decreases() {
        let mut vm = SectionVm::new(QuestionType::Audio);
        vm.begin_submit();
        vm.set_upload_progress(UploadProgress::new(40));
        vm.set_upload_progress(UploadProgress::new(20));
        assert_eq!(vm.upload_progress(), Some(UploadProgress::new(40)));
        vm.set_upload_progress(UploadProgress::DONE);
        assert_eq!(vm.upload_progress(), Some(UploadProgress::DONE));
    }

    #[test]
    fn failure_keeps_input_and_shows_message() {
        let mut vm = SectionVm::new(QuestionType::ShortAnswer);
        vm.set_draft("kept".into());
        vm.begin_submit();
        vm.fail("Please enter an answer before continuing.");
        assert_eq!(vm.phase(), SectionPhase::Idle);
        assert_eq!(vm.draft(), "kept");
        assert_eq!(vm.error(), Some("Please enter an answer before continuing."));
    }

    #[test]
    fn media_question_requires_a_path() {
        let mut vm = SectionVm::new(QuestionType::Video);
        assert_eq!(
            vm.input_for(QuestionType::Video),
            Err("Please choose a file to upload.".to_string())
        );
        vm.set_media_path("  /tmp/clip.mp4 ".into());
        assert_eq!(
            vm.input_for(QuestionType::Video),
            Ok(SectionInput::MediaPath(PathBuf::from("/tmp/clip.mp4")))
        );
    }

    #[test]
    fn navigation_maps_to_steps() {
        let mut vm = SectionVm::new(QuestionType::Mcq);
        vm.begin_submit();
        let same = QuestionSlot {
            section: QuestionType::Mcq,
            index: 1,
        };
        assert_eq!(
            vm.saved(Navigation::NextSection(QuestionType::Mcq), Some(same)),
            SectionStep::NextQuestion
        );
        assert_eq!(vm.phase(), SectionPhase::Idle);
        assert_eq!(vm.index, Some(1));

        vm.begin_submit();
        let audio = QuestionSlot {
            section: QuestionType::Audio,
            index: 1,
        };
        assert_eq!(
            vm.saved(Navigation::NextSection(QuestionType::Audio), Some(audio)),
            SectionStep::Section(QuestionType::Audio)
        );
        assert_eq!(vm, SectionVm::at(audio));
        assert_eq!(vm.skip(Navigation::Complete, None), SectionStep::Review);
        assert_eq!(vm.skip(Navigation::Unresolved, None), SectionStep::Stay);
    }

    #[tokio::test]
    async fn next_section_opens_on_the_navigator_target() {
        let mut session = demo_session().await;
        answer_any(&mut session, &QuestionId::new("short-1").unwrap());
        answer_any(&mut session, &QuestionId::new("audio-1").unwrap());

        let mut vm = SectionVm::new(QuestionType::Video);
        let current = QuestionId::new("audio-1").unwrap();
        let next = QuestionSlot::after(&session, &current);
        let step = vm.skip(session.navigate_from(Some(&current)), next);
        assert_eq!(step, SectionStep::Section(QuestionType::Mcq));

        // mcq-1 is still unanswered, but the global order continues at mcq-2.
        let question = vm.current_question(&session).unwrap();
        assert_eq!(question.id.as_str(), "mcq-2");
    }

    /// Follows every page the way the section view does until the review step.
    #[tokio::test]
    async fn interleaved_pass_reaches_review() {
        let mut session = demo_session().await;
        let order: Vec<QuestionId> = session
            .navigator()
            .global_order()
            .iter()
            .map(|q| q.id().clone())
            .collect();
        for id in order.iter().filter(|id| id.as_str() != "mcq-1") {
            answer_any(&mut session, id);
        }

        let mut vm = SectionVm::new(QuestionType::Mcq);
        let mut visited = Vec::new();
        let mut reached_review = false;
        for _ in 0..20 {
            let question = vm.current_question(&session).unwrap();
            visited.push(question.id.clone());
            let navigation = if question.is_answered() {
                session.navigate_from(Some(&question.id))
            } else {
                answer_any(&mut session, &question.id)
            };
            let next = QuestionSlot::after(&session, &question.id);
            let step = if question.is_answered() {
                vm.skip(navigation, next)
            } else {
                vm.saved(navigation, next)
            };
            match step {
                SectionStep::Review => {
                    reached_review = true;
                    break;
                }
                SectionStep::Section(section) => assert_eq!(vm.section(), section),
                SectionStep::NextQuestion => {}
                SectionStep::Stay => panic!("navigation stalled at {}", question.id),
            }
        }

        assert!(reached_review, "visited {visited:?}");
        assert_eq!(visited, order);
        assert_eq!(session.progress().remaining, 0);
    }
}
