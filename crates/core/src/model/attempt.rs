use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AssessmentId, AttemptId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment title cannot be empty")]
    EmptyTitle,
}

/// An assessment a learner can open from the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    id: AssessmentId,
    title: String,
    description: Option<String>,
}

impl Assessment {
    /// # Errors
    ///
    /// Returns `AssessmentError::EmptyTitle` for a blank title.
    pub fn new(
        id: AssessmentId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, AssessmentError> {
        let title = title.into();
        let title = title.trim();
        if title.is_empty() {
            return Err(AssessmentError::EmptyTitle);
        }
        Ok(Self {
            id,
            title: title.to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn id(&self) -> AssessmentId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// One learner's pass through an assessment.
///
/// Required before progress can be saved remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub assessment_id: AssessmentId,
    pub started_at: DateTime<Utc>,
}

impl Attempt {
    /// Start a fresh attempt with a generated id.
    #[must_use]
    pub fn start(assessment_id: AssessmentId, started_at: DateTime<Utc>) -> Self {
        Self {
            id: AttemptId::generate(),
            assessment_id,
            started_at,
        }
    }
}

/// Acknowledgement returned by a successful submit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub id: i64,
    pub attempt_id: AttemptId,
    pub submitted_at: DateTime<Utc>,
    pub answer_count: u32,
}
