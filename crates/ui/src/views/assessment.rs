use assess_core::model::AssessmentId;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::{AppContext, AttemptSlot};
use crate::routes::Route;
use crate::views::attempt::{ensure_attempt, entry_route, use_redirect_when_missing};
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// Starts (or reuses) the attempt and forwards to the section to work on.
#[component]
pub fn AssessmentView(assessment_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let slot = use_context::<AttemptSlot>().0;
    let navigator = use_navigator();
    let assessment_loop = ctx.assessment_loop();

    let resource = use_resource(move || {
        let assessment_loop = assessment_loop.clone();
        async move {
            ensure_attempt(&assessment_loop, slot, AssessmentId::new(assessment_id)).await?;
            slot.peek()
                .as_ref()
                .map(|session| entry_route(session, assessment_id))
                .ok_or(ViewError::Unknown)
        }
    });
    use_redirect_when_missing(resource);

    use_effect(move || {
        if let Some(Ok(route)) = resource.value().read().as_ref() {
            let _ = navigator.replace(route.clone());
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            match state {
                ViewState::Idle | ViewState::Loading | ViewState::Ready(_) => rsx! {
                    p { "Opening assessment..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "field-error", "{err.message()}" }
                    Link { to: Route::Home {}, "Back to assessments" }
                },
            }
        }
    }
}
