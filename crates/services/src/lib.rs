#![forbid(unsafe_code)]

pub mod app_services;
pub mod assessment;
pub mod error;
pub mod flaky;
pub mod remote;
pub mod submission;
pub mod upload;

pub use assess_core::Clock;

pub use app_services::{AppServices, BackendOptions};
pub use assessment::{
    AnswerOutcome, AnswerPayload, AssessmentCatalogService, AssessmentListItem,
    AssessmentLoopService, AssessmentService, AttemptProgress, SaveStatus,
};
pub use error::{AppServicesError, AssessmentError, RemoteError, SubmissionError, UploadError};
pub use flaky::{FailurePolicy, FlakyBackend};
pub use remote::HttpAssessmentBackend;
pub use submission::{ReviewItem, ReviewSheet, SubmissionFlow, SubmissionState};
pub use upload::{UploadProgress, UploadSimulator, probe_media};
