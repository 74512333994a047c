use std::sync::Arc;

use assess_core::model::{Assessment, AssessmentId};
use storage::repository::{AssessmentRepository, QuestionRepository, StorageError};

/// Assessment list entry with its question count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentListItem {
    pub assessment: Assessment,
    pub question_count: usize,
}

/// Read-only access to the assessments a learner can open.
#[derive(Clone)]
pub struct AssessmentCatalogService {
    assessments: Arc<dyn AssessmentRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl AssessmentCatalogService {
    #[must_use]
    pub fn new(
        assessments: Arc<dyn AssessmentRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            assessments,
            questions,
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the list cannot be read.
    pub async fn list_assessments(
        &self,
        limit: u32,
    ) -> Result<Vec<AssessmentListItem>, StorageError> {
        let assessments = self.assessments.list_assessments(limit).await?;
        let mut out = Vec::with_capacity(assessments.len());
        for assessment in assessments {
            let question_count = self.questions.get_questions(assessment.id()).await?.len();
            out.push(AssessmentListItem {
                assessment,
                question_count,
            });
        }
        Ok(out)
    }

    /// Fetch one assessment; `None` sends the UI back to the list view.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    pub async fn get_assessment(
        &self,
        id: AssessmentId,
    ) -> Result<Option<Assessment>, StorageError> {
        self.assessments.get_assessment(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::demo::seed_demo;
    use storage::repository::Storage;

    #[tokio::test]
    async fn lists_with_question_counts_and_misses_unknown_ids() {
        let storage = Storage::in_memory();
        seed_demo(&storage, AssessmentId::new(1)).await.unwrap();
        let catalog = AssessmentCatalogService::new(
            Arc::clone(&storage.assessments),
            Arc::clone(&storage.questions),
        );

        let items = catalog.list_assessments(10).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question_count, 6);
        assert!(catalog.get_assessment(AssessmentId::new(99)).await.unwrap().is_none());
    }
}
