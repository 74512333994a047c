use std::sync::Arc;

use assess_core::model::{AssessmentId, QuestionType};
use assess_core::time::fixed_clock;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{
    AssessmentCatalogService, AssessmentLoopService, AssessmentService, UploadSimulator,
};
use storage::demo::seed_demo;
use storage::repository::{AssessmentRepository, Storage};

use crate::context::{AttemptSlot, Flash, UiApp, build_app_context};
use crate::views::{HomeView, ReviewView, SectionView};

pub const DEMO_ID: u64 = 1;

#[derive(Clone)]
pub struct TestApp {
    pub catalog: Arc<AssessmentCatalogService>,
    pub assessment_loop: Arc<AssessmentLoopService>,
}

impl TestApp {
    pub fn new(storage: &Storage) -> Self {
        Self::with_assessments(storage, Arc::clone(&storage.assessments))
    }

    pub fn with_assessments(storage: &Storage, assessments: Arc<dyn AssessmentRepository>) -> Self {
        Self {
            catalog: Arc::new(AssessmentCatalogService::new(
                assessments,
                Arc::clone(&storage.questions),
            )),
            assessment_loop: Arc::new(AssessmentLoopService::from_storage(fixed_clock(), storage)),
        }
    }
}

impl UiApp for TestApp {
    fn current_assessment_id(&self) -> AssessmentId {
        AssessmentId::new(DEMO_ID)
    }

    fn catalog(&self) -> Arc<AssessmentCatalogService> {
        Arc::clone(&self.catalog)
    }

    fn assessment_loop(&self) -> Arc<AssessmentLoopService> {
        Arc::clone(&self.assessment_loop)
    }

    fn uploads(&self) -> UploadSimulator {
        UploadSimulator::instant()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Section(u64, QuestionType),
    Review(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    attempt: Option<AssessmentService>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);

    let attempt = props.attempt.clone();
    let slot = use_signal(move || attempt);
    let flash = use_signal(|| None::<String>);
    use_context_provider(|| AttemptSlot(slot));
    use_context_provider(|| Flash(flash));

    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Section(assessment_id, section) => rsx! { SectionView { assessment_id, section } },
        ViewKind::Review(assessment_id) => rsx! { ReviewView { assessment_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub async fn seeded_storage() -> Storage {
    let storage = Storage::in_memory();
    seed_demo(&storage, AssessmentId::new(DEMO_ID))
        .await
        .expect("seed demo assessment");
    storage
}

pub fn mount(view: ViewKind, app: TestApp, attempt: Option<AssessmentService>) -> ViewHarness {
    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::new(app),
            view,
            attempt,
        },
    );
    ViewHarness { dom }
}

pub async fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let storage = seeded_storage().await;
    mount(view, TestApp::new(&storage), None)
}
