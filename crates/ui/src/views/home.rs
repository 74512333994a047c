use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::{AppContext, AttemptSlot};
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AssessmentCardVm, map_assessment_cards};

const LIST_LIMIT: u32 = 50;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut slot = use_context::<AttemptSlot>().0;
    let catalog = ctx.catalog();
    let current = ctx.current_assessment_id();

    // Leaving an assessment discards its attempt.
    use_effect(move || {
        if slot.peek().is_some() {
            slot.set(None);
        }
    });

    let mut resource = use_resource(move || {
        let catalog = catalog.clone();
        async move {
            let items = catalog
                .list_assessments(LIST_LIMIT)
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok(map_assessment_cards(&items, current))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Assessments" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(cards) => rsx! {
                    if cards.is_empty() {
                        p { "No assessments available yet." }
                    } else {
                        ul { class: "assessment-list",
                            for card in cards {
                                AssessmentCard { key: "{card.id}", card }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn AssessmentCard(card: AssessmentCardVm) -> Element {
    let class = if card.is_current {
        "assessment-card assessment-card--current"
    } else {
        "assessment-card"
    };

    rsx! {
        li { class: "{class}",
            h3 { "{card.title}" }
            if let Some(html) = card.description_html.as_deref() {
                div { class: "assessment-card__description", dangerous_inner_html: "{html}" }
            }
            p { class: "assessment-card__meta", "{card.question_count_label}" }
            if card.can_start {
                Link {
                    class: "btn btn-primary",
                    to: Route::Assessment { assessment_id: card.id },
                    "Start"
                }
            } else {
                span { class: "assessment-card__meta", "Not ready yet" }
            }
        }
    }
}
