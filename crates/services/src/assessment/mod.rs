mod catalog;
mod progress;
mod service;
mod workflow;

// Public API of the assessment subsystem.
pub use crate::error::AssessmentError;
pub use catalog::{AssessmentCatalogService, AssessmentListItem};
pub use progress::AttemptProgress;
pub use service::AssessmentService;
pub use workflow::{AnswerOutcome, AnswerPayload, AssessmentLoopService, SaveStatus};
