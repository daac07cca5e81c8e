//! Client-side state containers for the dashboard views.
//!
//! Each container owns the data a view renders, a loading flag, and the
//! mutations the view can dispatch. All traffic goes through a [`Transport`],
//! so the same containers run against the in-process router or a remote
//! server.

pub mod assessments;
pub mod candidates;
mod http;
pub mod jobs;
mod local;
pub mod optimistic;

pub use assessments::{AssessmentEditor, AssessmentRunner, SaveConfirmation};
pub use candidates::{
    export_candidates, CandidateFilter, CandidateProfile, CandidatesBoard, RevealWindow,
};
pub use http::HttpTransport;
pub use jobs::{filter_jobs, move_job, JobsBoard};
pub use local::LocalTransport;
pub use optimistic::{Settlement, Tentative};

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::hiring::domain::{
    AnswerMap, Assessment, Candidate, CandidatePatch, Job, JobDraft, JobPatch, ReorderRequest,
    TimelineEntry,
};

/// Status and decoded JSON body of one API call.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

/// Moves one HTTP-shaped request to the backend and back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<Value>)
        -> Result<Reply, ClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("request failed with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Typed wrapper over the `/api` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ClientError> {
        let body = body.map(serde_json::to_value).transpose()?;
        let Reply { status, body } = self.transport.send(method, path, body).await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        Err(ClientError::Status { status, message })
    }

    async fn fetch<R: DeserializeOwned>(&self, path: &str, field: &str) -> Result<R, ClientError> {
        let body = self.call::<Value>(Method::GET, path, None).await?;
        extract(body, field)
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>, ClientError> {
        self.fetch("/api/jobs", "jobs").await
    }

    pub async fn create_job(&self, draft: &JobDraft) -> Result<Job, ClientError> {
        let body = self.call(Method::POST, "/api/jobs", Some(draft)).await?;
        extract(body, "job")
    }

    pub async fn update_job(&self, id: &str, patch: &JobPatch) -> Result<Job, ClientError> {
        let body = self
            .call(Method::PATCH, &format!("/api/jobs/{id}"), Some(patch))
            .await?;
        extract(body, "job")
    }

    pub async fn reorder_job(&self, id: &str, order: u32) -> Result<(), ClientError> {
        self.call(
            Method::PATCH,
            &format!("/api/jobs/{id}/reorder"),
            Some(&ReorderRequest { order }),
        )
        .await?;
        Ok(())
    }

    pub async fn list_candidates(&self) -> Result<Vec<Candidate>, ClientError> {
        self.fetch("/api/candidates", "candidates").await
    }

    pub async fn get_candidate(&self, id: &str) -> Result<Candidate, ClientError> {
        self.fetch(&format!("/api/candidates/{id}"), "candidate")
            .await
    }

    pub async fn update_candidate(
        &self,
        id: &str,
        patch: &CandidatePatch,
    ) -> Result<Candidate, ClientError> {
        let body = self
            .call(Method::PATCH, &format!("/api/candidates/{id}"), Some(patch))
            .await?;
        extract(body, "candidate")
    }

    pub async fn candidate_timeline(&self, id: &str) -> Result<Vec<TimelineEntry>, ClientError> {
        self.fetch(&format!("/api/candidates/{id}/timeline"), "timeline")
            .await
    }

    pub async fn get_assessment(&self, job_id: &str) -> Result<Assessment, ClientError> {
        self.fetch(&format!("/api/assessments/{job_id}"), "assessment")
            .await
    }

    pub async fn save_assessment(&self, assessment: &Assessment) -> Result<Assessment, ClientError> {
        let path = format!("/api/assessments/{}", assessment.job_id);
        let body = self.call(Method::PUT, &path, Some(assessment)).await?;
        extract(body, "assessment")
    }

    pub async fn submit_response(&self, job_id: &str, answers: &AnswerMap) -> Result<(), ClientError> {
        self.call(
            Method::POST,
            &format!("/api/assessments/{job_id}/submit"),
            Some(answers),
        )
        .await?;
        Ok(())
    }
}

/// Unwrap `{ "<field>": ... }`, accepting a bare payload as well.
fn extract<R: DeserializeOwned>(mut body: Value, field: &str) -> Result<R, ClientError> {
    if let Some(value) = body.get_mut(field) {
        return Ok(serde_json::from_value(value.take())?);
    }
    Ok(serde_json::from_value(body)?)
}

/// Body used by transports when the server sent something that is not JSON.
pub(crate) fn non_json_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| json!({ "error": String::from_utf8_lossy(bytes).trim().to_string() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_unwraps_envelopes_and_bare_payloads() {
        let wrapped: Vec<u32> = extract(json!({ "jobs": [1, 2] }), "jobs").expect("wrapped");
        assert_eq!(wrapped, vec![1, 2]);
        let bare: Vec<u32> = extract(json!([3]), "jobs").expect("bare");
        assert_eq!(bare, vec![3]);
    }

    #[test]
    fn plain_text_errors_become_error_objects() {
        assert_eq!(
            non_json_body(b"Failed to parse body\n"),
            json!({ "error": "Failed to parse body" })
        );
        assert_eq!(non_json_body(b""), Value::Null);
    }
}
