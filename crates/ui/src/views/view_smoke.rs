use std::sync::Arc;

use assess_core::model::{Assessment, AssessmentId, QuestionId, QuestionType};
use services::AnswerPayload;
use services::AssessmentLoopService;
use storage::repository::{AssessmentRepository, StorageError};

use super::test_harness::{
    DEMO_ID, TestApp, ViewKind, mount, seeded_storage, setup_view_harness,
};

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_lists_assessments() {
    let mut harness = setup_view_harness(ViewKind::Home).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Rust Fundamentals"), "missing title in {html}");
    assert!(html.contains("6 questions"), "missing count in {html}");
    assert!(html.contains("Start"), "missing start link in {html}");
    assert!(html.contains("assessment-card--current"), "missing current marker in {html}");
}

struct FailingAssessments;

#[async_trait::async_trait]
impl AssessmentRepository for FailingAssessments {
    async fn upsert_assessment(&self, _assessment: &Assessment) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn get_assessment(&self, _id: AssessmentId) -> Result<Option<Assessment>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_assessments(&self, _limit: u32) -> Result<Vec<Assessment>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_error_state() {
    let storage = seeded_storage().await;
    let app = TestApp::with_assessments(&storage, Arc::new(FailingAssessments));
    let mut harness = mount(ViewKind::Home, app, None);
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn section_view_smoke_renders_first_mcq() {
    let mut harness = setup_view_harness(ViewKind::Section(DEMO_ID, QuestionType::Mcq)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Multiple choice"), "missing section title in {html}");
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("0 of 6 answered"), "missing progress in {html}");
    assert!(html.contains("type=\"radio\""), "missing choices in {html}");
    assert!(html.contains("Save and continue"), "missing submit button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn section_view_smoke_renders_media_input() {
    let mut harness = setup_view_harness(ViewKind::Section(DEMO_ID, QuestionType::Audio)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Audio response"), "missing section title in {html}");
    assert!(html.contains("Path to your recording"), "missing path input in {html}");
    assert!(html.contains("Upload and continue"), "missing upload button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn section_view_smoke_shows_answered_question_read_only() {
    let storage = seeded_storage().await;
    let app = TestApp::new(&storage);
    let mut session = app
        .assessment_loop
        .start_attempt(AssessmentId::new(DEMO_ID))
        .await
        .unwrap();
    for (id, text) in [("short-1", "Each value has one owner."), ("short-2", "A shared borrow.")] {
        AssessmentLoopService::record_local(
            &mut session,
            &QuestionId::new(id).unwrap(),
            AnswerPayload::Text(text.into()),
        )
        .unwrap();
    }

    let mut harness = mount(
        ViewKind::Section(DEMO_ID, QuestionType::ShortAnswer),
        app,
        Some(session),
    );
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("You already answered this question."), "missing note in {html}");
    assert!(html.contains("Each value has one owner."), "missing stored answer in {html}");
    assert!(html.contains("2 of 6 answered"), "missing progress in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
    assert!(!html.contains("<textarea"), "answered question should be read-only: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn review_view_smoke_flags_unanswered() {
    let mut harness = setup_view_harness(ViewKind::Review(DEMO_ID)).await;
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Review your answers"), "missing title in {html}");
    assert!(
        html.contains("6 questions are unanswered. You can still submit."),
        "missing notice in {html}"
    );
    assert!(html.contains("Not answered"), "missing row state in {html}");
    assert!(html.contains("Submit assessment"), "missing submit button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn review_view_smoke_offers_retry_after_failed_submit() {
    let storage = seeded_storage().await;
    let app = TestApp::new(&storage);
    let mut session = app
        .assessment_loop
        .start_attempt(AssessmentId::new(DEMO_ID))
        .await
        .unwrap();
    let flow = session.submission_mut();
    flow.begin().unwrap();
    let _ = flow.finish(Err(StorageError::Connection("simulated".into())));

    let mut harness = mount(ViewKind::Review(DEMO_ID), app, Some(session));
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Failed to submit assessment"), "missing error in {html}");
    assert!(html.contains("Retry submission"), "missing retry in {html}");
}
