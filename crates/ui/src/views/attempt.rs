use assess_core::model::AssessmentId;
use dioxus::prelude::*;
use dioxus_router::use_navigator;
use services::{AssessmentError, AssessmentLoopService, AssessmentService};

use crate::context::Flash;
use crate::routes::Route;
use crate::views::ViewError;

/// Make sure `slot` holds an attempt for `assessment_id`, starting one if needed.
pub(crate) async fn ensure_attempt(
    assessment_loop: &AssessmentLoopService,
    mut slot: Signal<Option<AssessmentService>>,
    assessment_id: AssessmentId,
) -> Result<(), ViewError> {
    let already_open = slot
        .peek()
        .as_ref()
        .is_some_and(|session| session.assessment_id() == assessment_id);
    if already_open {
        return Ok(());
    }

    let session = assessment_loop
        .start_attempt(assessment_id)
        .await
        .map_err(|err| match err {
            AssessmentError::NotFound(_) => ViewError::NotFound,
            _ => ViewError::Unknown,
        })?;
    if session.store().questions().is_empty() {
        return Err(ViewError::EmptyAssessment);
    }
    slot.set(Some(session));
    Ok(())
}

/// Where a learner opening the assessment lands: the first unanswered
/// question's section, or the review step once everything is answered.
#[must_use]
pub(crate) fn entry_route(session: &AssessmentService, assessment_id: u64) -> Route {
    match session.resume_point() {
        Some(question) => Route::Section {
            assessment_id,
            section: question.question_type(),
        },
        None => Route::Review { assessment_id },
    }
}

/// Send the learner back to the list when the routed assessment does not exist.
pub(crate) fn use_redirect_when_missing<T: 'static>(resource: Resource<Result<T, ViewError>>) {
    let navigator = use_navigator();
    let mut flash = use_context::<Flash>().0;
    use_effect(move || {
        let missing = matches!(
            resource.value().read().as_ref(),
            Some(Err(ViewError::NotFound))
        );
        if missing {
            flash.set(Some(ViewError::NotFound.message().to_string()));
            let _ = navigator.replace(Route::Home {});
        }
    });
}
