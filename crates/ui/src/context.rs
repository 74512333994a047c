use std::sync::Arc;

use assess_core::model::AssessmentId;
use dioxus::prelude::*;
use services::{AssessmentCatalogService, AssessmentLoopService, AssessmentService, UploadSimulator};

pub trait UiApp: Send + Sync {
    fn current_assessment_id(&self) -> AssessmentId;

    fn catalog(&self) -> Arc<AssessmentCatalogService>;
    fn assessment_loop(&self) -> Arc<AssessmentLoopService>;
    fn uploads(&self) -> UploadSimulator;
}

#[derive(Clone)]
pub struct AppContext {
    current_assessment_id: AssessmentId,
    catalog: Arc<AssessmentCatalogService>,
    assessment_loop: Arc<AssessmentLoopService>,
    uploads: UploadSimulator,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            current_assessment_id: app.current_assessment_id(),
            catalog: app.catalog(),
            assessment_loop: app.assessment_loop(),
            uploads: app.uploads(),
        }
    }

    #[must_use]
    pub fn current_assessment_id(&self) -> AssessmentId {
        self.current_assessment_id
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<AssessmentCatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn assessment_loop(&self) -> Arc<AssessmentLoopService> {
        Arc::clone(&self.assessment_loop)
    }

    #[must_use]
    pub fn uploads(&self) -> UploadSimulator {
        self.uploads
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

/// The attempt currently being taken. Dropped when the learner returns to the list.
#[derive(Clone, Copy, PartialEq)]
pub struct AttemptSlot(pub Signal<Option<AssessmentService>>);

/// One-line toast shown above the routed page.
#[derive(Clone, Copy, PartialEq)]
pub struct Flash(pub Signal<Option<String>>);

/// Provide the per-window attempt slot and toast signal to every descendant.
pub fn use_attempt_providers() -> (AttemptSlot, Flash) {
    let slot = use_signal(|| None::<AssessmentService>);
    let flash = use_signal(|| None::<String>);
    let slot = use_context_provider(|| AttemptSlot(slot));
    let flash = use_context_provider(|| Flash(flash));
    (slot, flash)
}
