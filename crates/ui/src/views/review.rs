use std::sync::Arc;

use assess_core::model::AssessmentId;
use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};

use crate::context::{AppContext, AttemptSlot, Flash};
use crate::routes::Route;
use crate::views::attempt::{ensure_attempt, use_redirect_when_missing};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ReviewRowVm, ReviewVm, submission_toast};

/// Confirmation step: every question with its answer, then one submit call.
#[component]
pub fn ReviewView(assessment_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let mut slot = use_context::<AttemptSlot>().0;
    let mut flash = use_context::<Flash>().0;
    let navigator = use_navigator();
    let assessment_loop = ctx.assessment_loop();

    let loop_for_resource = Arc::clone(&assessment_loop);
    let resource = use_resource(move || {
        let assessment_loop = loop_for_resource.clone();
        async move {
            ensure_attempt(&assessment_loop, slot, AssessmentId::new(assessment_id)).await
        }
    });
    use_redirect_when_missing(resource);
    let state = view_state_from_resource(&resource);

    let on_submit = use_callback(move |()| {
        let begun = {
            let mut guard = slot.write();
            let Some(session) = guard.as_mut() else {
                return;
            };
            session
                .submission_mut()
                .begin()
                .map(|()| (session.attempt_id(), session.store().answers().to_vec()))
        };
        // A call already in flight, or an attempt already submitted.
        let Ok((attempt_id, answers)) = begun else {
            return;
        };

        let assessment_loop = Arc::clone(&assessment_loop);
        spawn(async move {
            let result = assessment_loop.send_submission(attempt_id, &answers).await;
            let settled = slot
                .write()
                .as_mut()
                .map(|session| session.submission_mut().finish(result));
            let Some(settled) = settled else {
                return;
            };
            flash.set(Some(submission_toast(&settled)));
            if settled.is_ok() {
                slot.set(None);
                let _ = navigator.push(Route::Home {});
            }
        });
    });

    let vm = slot.read().as_ref().map(ReviewVm::from_session);

    rsx! {
        div { class: "page review-page",
            h2 { "Review your answers" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "field-error", "{err.message()}" }
                    Link { to: Route::Home {}, "Back to assessments" }
                },
                ViewState::Ready(()) => rsx! {
                    if let Some(vm) = vm {
                        p { class: "section-progress", "{vm.answered} of {vm.total} answered" }
                        if let Some(notice) = vm.unanswered_notice() {
                            p { class: "field-warning", "{notice}" }
                        }
                        ul { class: "review-list",
                            for row in vm.rows.iter().cloned() {
                                ReviewRow { key: "{row.question_id}", row, assessment_id }
                            }
                        }
                        if let Some(error) = vm.error.as_deref() {
                            p { class: "field-error", role: "alert", "{error}" }
                        }
                        div { class: "actions",
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                disabled: !vm.can_submit(),
                                onclick: move |_| on_submit.call(()),
                                "{vm.submit_label()}"
                            }
                        }
                    } else {
                        p { "{ViewError::Unknown.message()}" }
                    }
                },
            }
        }
    }
}

#[component]
fn ReviewRow(row: ReviewRowVm, assessment_id: u64) -> Element {
    let class = if row.answered {
        "review-item"
    } else {
        "review-item review-item--missing"
    };

    rsx! {
        li { class: "{class}",
            span { class: "review-item__section", "{row.section_label}" }
            div { class: "review-item__prompt", dangerous_inner_html: "{row.prompt_html}" }
            p { class: "review-item__answer", "{row.answer_label}" }
            if !row.answered {
                Link {
                    to: Route::Section { assessment_id, section: row.section },
                    "Answer now"
                }
            }
        }
    }
}
