use assess_core::model::QuestionType;
use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::context::{Flash, use_attempt_providers};
use crate::views::{AssessmentView, HomeView, ReviewView, SectionView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/assessments/:assessment_id", AssessmentView)] Assessment { assessment_id: u64 },
        #[route("/assessments/:assessment_id/section/:section", SectionView)] Section { assessment_id: u64, section: QuestionType },
        #[route("/assessments/:assessment_id/review", ReviewView)] Review { assessment_id: u64 },
}

#[component]
fn Layout() -> Element {
    let (_, flash) = use_attempt_providers();

    rsx! {
        div { class: "app",
            nav { class: "topbar",
                h1 { "Assessments" }
                Link { to: Route::Home {}, "All assessments" }
            }
            Toast { flash }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
pub fn Toast(flash: Flash) -> Element {
    let mut signal = flash.0;
    let message = signal.read().clone();

    rsx! {
        if let Some(message) = message {
            div { class: "toast", role: "status",
                span { "{message}" }
                button {
                    class: "toast__close",
                    r#type: "button",
                    onclick: move |_| signal.set(None),
                    "Dismiss"
                }
            }
        }
    }
}
