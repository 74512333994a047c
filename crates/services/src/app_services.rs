use std::sync::Arc;

use assess_core::model::AssessmentId;
use storage::demo::seed_demo;
use storage::repository::{
    AssessmentRepository, ProgressRepository, QuestionRepository, Storage, SubmissionRepository,
};
use tracing::info;

use crate::Clock;
use crate::assessment::{AssessmentCatalogService, AssessmentLoopService};
use crate::error::AppServicesError;
use crate::flaky::{FailurePolicy, FlakyBackend};
use crate::remote::HttpAssessmentBackend;
use crate::upload::UploadSimulator;

/// Knobs for how the collaborators behave.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    pub failure_policy: FailurePolicy,
    /// When set, questions, progress and submissions go to this REST API.
    pub api_url: Option<String>,
    pub upload: UploadSimulator,
}

/// Assembles app-facing services and resolves a usable assessment id.
#[derive(Clone)]
pub struct AppServices {
    assessment_id: AssessmentId,
    catalog: Arc<AssessmentCatalogService>,
    assessment_loop: Arc<AssessmentLoopService>,
    uploads: UploadSimulator,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or demo setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        preferred_assessment_id: AssessmentId,
        options: BackendOptions,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, clock, preferred_assessment_id, options).await
    }

    /// Build services backed by in-memory storage seeded with the demo assessment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if demo setup fails.
    pub async fn in_memory(
        clock: Clock,
        preferred_assessment_id: AssessmentId,
        options: BackendOptions,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::in_memory();
        Self::from_storage(&storage, clock, preferred_assessment_id, options).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError` if the API URL is invalid or demo setup fails.
    pub async fn from_storage(
        storage: &Storage,
        clock: Clock,
        preferred_assessment_id: AssessmentId,
        options: BackendOptions,
    ) -> Result<Self, AppServicesError> {
        let assessment_id = ensure_default_assessment(storage, preferred_assessment_id).await?;

        let (questions, progress, submissions): (
            Arc<dyn QuestionRepository>,
            Arc<dyn ProgressRepository>,
            Arc<dyn SubmissionRepository>,
        ) = match options.api_url.as_deref() {
            Some(url) => {
                let backend = HttpAssessmentBackend::new(url)?;
                info!(base_url = %backend.base_url(), "using remote assessment API");
                (
                    Arc::new(backend.clone()),
                    Arc::new(backend.clone()),
                    Arc::new(backend),
                )
            }
            None => (
                Arc::clone(&storage.questions),
                Arc::clone(&storage.progress),
                Arc::clone(&storage.submissions),
            ),
        };

        let (progress, submissions): (Arc<dyn ProgressRepository>, Arc<dyn SubmissionRepository>) =
            if options.failure_policy == FailurePolicy::Never {
                (progress, submissions)
            } else {
                info!(policy = ?options.failure_policy, "failure injection enabled");
                let flaky = FlakyBackend::new(options.failure_policy, progress, submissions);
                (Arc::new(flaky.clone()), Arc::new(flaky))
            };

        let catalog = Arc::new(AssessmentCatalogService::new(
            Arc::clone(&storage.assessments),
            Arc::clone(&questions),
        ));
        let assessment_loop = Arc::new(AssessmentLoopService::new(
            clock,
            Arc::clone(&storage.assessments),
            questions,
            Arc::clone(&storage.attempts),
            progress,
            submissions,
        ));

        Ok(Self {
            assessment_id,
            catalog,
            assessment_loop,
            uploads: options.upload,
        })
    }

    #[must_use]
    pub fn assessment_id(&self) -> AssessmentId {
        self.assessment_id
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

async fn ensure_default_assessment(
    storage: &Storage,
    preferred_id: AssessmentId,
) -> Result<AssessmentId, AppServicesError> {
    let assessments: &dyn AssessmentRepository = storage.assessments.as_ref();
    if assessments.get_assessment(preferred_id).await?.is_some() {
        return Ok(preferred_id);
    }

    let existing = assessments.list_assessments(128).await?;
    if let Some(first) = existing.first() {
        return Ok(first.id());
    }

    let seeded = seed_demo(storage, preferred_id).await?;
    info!(assessment_id = %seeded.id(), "seeded demo assessment");
    Ok(seeded.id())
}
