//! REST adapter for the question, progress and submission collaborators.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use assess_core::model::{
    Answer, AssessmentId, AttemptId, QuestionGroups, QuestionType, SubmissionReceipt,
};
use storage::repository::{
    ProgressRepository, QuestionRecord, QuestionRepository, StorageError, SubmissionRepository,
    groups_from_records,
};
use tracing::debug;

use crate::error::RemoteError;

/// One question group on the wire. Groups travel as a list so declaration order survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGroupBody {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswersBody {
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionBody {
    pub answers: Vec<Answer>,
    pub submitted_at: DateTime<Utc>,
}

/// HTTP client for a remote assessment API.
#[derive(Clone, Debug)]
pub struct HttpAssessmentBackend {
    client: Client,
    base: Url,
}

impl HttpAssessmentBackend {
    /// # Errors
    ///
    /// Returns `RemoteError::BaseUrl` if `base_url` is not an absolute http(s) URL,
    /// or `RemoteError::Http` if the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base = Url::parse(&format!("{trimmed}/"))
            .map_err(|_| RemoteError::BaseUrl(base_url.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RemoteError::BaseUrl(base_url.to_string()));
        }
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.base
            .join(path)
            .map_err(|_| RemoteError::BaseUrl(self.base.to_string()))
    }

    fn questions_url(&self, id: AssessmentId) -> Result<Url, RemoteError> {
        self.endpoint(&format!("assessments/{id}/questions"))
    }

    fn progress_url(&self, id: AttemptId) -> Result<Url, RemoteError> {
        self.endpoint(&format!("attempts/{id}/progress"))
    }

    fn submission_url(&self, id: AttemptId) -> Result<Url, RemoteError> {
        self.endpoint(&format!("attempts/{id}/submission"))
    }
}

async fn send(request: RequestBuilder) -> Result<reqwest::Response, RemoteError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(RemoteError::HttpStatus(status));
    }
    Ok(response)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RemoteError> {
    Ok(send(request).await?.json().await?)
}

#[async_trait]
impl QuestionRepository for HttpAssessmentBackend {
    async fn replace_questions(
        &self,
        assessment_id: AssessmentId,
        groups: &QuestionGroups,
    ) -> Result<(), StorageError> {
        let body: Vec<QuestionGroupBody> = groups
            .groups()
            .iter()
            .map(|g| QuestionGroupBody {
                question_type: g.question_type(),
                questions: g.questions().iter().map(QuestionRecord::from_question).collect(),
            })
            .collect();
        let url = self.questions_url(assessment_id)?;
        send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn get_questions(
        &self,
        assessment_id: AssessmentId,
    ) -> Result<QuestionGroups, StorageError> {
        let url = self.questions_url(assessment_id)?;
        debug!(%url, "fetching questions");
        let body: Vec<QuestionGroupBody> = send_json(self.client.get(url)).await?;

        let mut records = Vec::new();
        for group in body {
            for record in group.questions {
                if record.question_type != group.question_type {
                    return Err(StorageError::Serialization(format!(
                        "question {} is listed under {}",
                        record.id, group.question_type
                    )));
                }
                records.push(record);
            }
        }
        groups_from_records(records)
    }
}

#[async_trait]
impl ProgressRepository for HttpAssessmentBackend {
    async fn save_progress(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
    ) -> Result<(), StorageError> {
        let url = self.progress_url(attempt_id)?;
        let body = AnswersBody {
            answers: answers.to_vec(),
        };
        send(self.client.put(url).json(&body)).await?;
        Ok(())
    }

    async fn load_progress(&self, attempt_id: AttemptId) -> Result<Vec<Answer>, StorageError> {
        let url = self.progress_url(attempt_id)?;
        let body: AnswersBody = send_json(self.client.get(url)).await?;
        Ok(body.answers)
    }
}

#[async_trait]
impl SubmissionRepository for HttpAssessmentBackend {
    async fn submit(
        &self,
        attempt_id: AttemptId,
        answers: &[Answer],
        submitted_at: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, StorageError> {
        let url = self.submission_url(attempt_id)?;
        let body = SubmissionBody {
            answers: answers.to_vec(),
            submitted_at,
        };
        Ok(send_json(self.client.post(url).json(&body)).await?)
    }

    async fn get_submission(
        &self,
        attempt_id: AttemptId,
    ) -> Result<SubmissionReceipt, StorageError> {
        let url = self.submission_url(attempt_id)?;
        Ok(send_json(self.client.get(url)).await?)
    }
}
