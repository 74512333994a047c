//! Failure injection for the best-effort collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use assess_core::model::{Answer, AttemptId, SubmissionReceipt};
use storage::repository::{ProgressRepository, StorageError, SubmissionRepository};
use tracing::debug;

/// When a wrapped call is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FailurePolicy {
    #[default]
    Never,
    Always,
    /// Reject each call independently with this probability (clamped to `0.0..=1.0`).
    Random { failure_rate: f64 },
}

impl FailurePolicy {
    /// Map a rate to a policy: `<= 0` never fails, `>= 1` always fails.
    #[must_use]
    pub fn from_rate(failure_rate: f64) -> Self {
        if failure_rate.is_nan() || failure_rate <= 0.0 {
            FailurePolicy::Never
        } else if failure_rate >= 1.0 {
            FailurePolicy::Always
        } else {
            FailurePolicy::Random { failure_rate }
        }
    }

    #[must_use]
    pub fn should_fail(self) -> bool {
        match self {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::Random { failure_rate } if failure_rate.is_nan() => false,
            FailurePolicy::Random { failure_rate } => {
                rng().random_bool(failure_rate.clamp(0.0, 1.0))
            }
        }
    }
}

/// Wraps progress and submission repositories with a simulated transport error.
#[derive(Clone)]
pub struct FlakyBackend {
    policy: FailurePolicy,
    progress: Arc<dyn ProgressRepository>,
    submissions: Arc<dyn SubmissionRepository>,
}

impl FlakyBackend {
    #[must_use]
    pub fn new(
        policy: FailurePolicy,
        progress: Arc<dyn ProgressRepository>,
        submissions: Arc<dyn SubmissionRepository>,
    ) -> Self {
        Self {
            policy,
            progress,
            submissions,
        }
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    fn check(&self, call: &'static str) -> Result<(), StorageError> {
        if self.policy.should_fail() {
            debug!(call, "injected failure");
            return Err(StorageError::Connection(format!(
                "simulated network error during {call}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for FlakyBackend {
    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), StorageError> {
        self.check("save progress")?;
        self.progress.save_progress(attempt_id, answers).await
    }

    async fn load_progress(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        self.progress.load_progress(attempt_id).await
    }
}

#[async_trait]
impl SubmissionRepository for FlakyBackend {
    async fn submit(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, StorageError> {
        self.check("submit")?;
        self.submissions
            .submit(attempt_id, answers, submitted_at)
            .await
    }

    async fn get_submission(
        &self,
        attempt_id: AttemptId,
    ) -> Result<SubmissionReceipt, StorageError> {
        self.submissions.get_submission(attempt_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_maps_to_policy() {
        assert_eq!(FailurePolicy::from_rate(0.0), FailurePolicy::Never);
        assert_eq!(FailurePolicy::from_rate(-1.0), FailurePolicy::Never);
        assert_eq!(FailurePolicy::from_rate(f64::NAN), FailurePolicy::Never);
        assert_eq!(FailurePolicy::from_rate(1.5), FailurePolicy::Always);
        assert_eq!(
            FailurePolicy::from_rate(0.25),
            FailurePolicy::Random { failure_rate: 0.25 }
        );
    }

    #[test]
    fn fixed_policies_are_deterministic() {
        assert!((0..32).all(|_| !FailurePolicy::Never.should_fail()));
        assert!((0..32).all(|_| FailurePolicy::Always.should_fail()));
    }

    #[test]
    fn out_of_range_random_rates_do_not_panic() {
        let nan = FailurePolicy::Random {
            failure_rate: f64::NAN,
        };
        assert!((0..32).all(|_| !nan.should_fail()));

        let above = FailurePolicy::Random { failure_rate: 7.0 };
        assert!((0..32).all(|_| above.should_fail()));
    }
}
