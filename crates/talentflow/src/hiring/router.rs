use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{AnswerMap, Assessment, CandidatePatch, JobDraft, JobPatch, ReorderRequest};
use super::faults::{FaultInjector, LatencyPolicy};
use super::service::{HiringService, ServiceError};
use crate::storage::{KeyValueStore, RepositoryError};

/// Router builder exposing the `/api` endpoints. Every route is delayed by
/// `latency`.
pub fn hiring_router<S, F>(service: Arc<HiringService<S, F>>, latency: LatencyPolicy) -> Router
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    Router::new()
        .route(
            "/api/jobs",
            get(list_jobs_handler::<S, F>).post(create_job_handler::<S, F>),
        )
        .route("/api/jobs/:id", patch(update_job_handler::<S, F>))
        .route("/api/jobs/:id/reorder", patch(reorder_job_handler::<S, F>))
        .route("/api/candidates", get(list_candidates_handler::<S, F>))
        .route(
            "/api/candidates/:id",
            get(get_candidate_handler::<S, F>).patch(update_candidate_handler::<S, F>),
        )
        .route(
            "/api/candidates/:id/timeline",
            get(timeline_handler::<S, F>),
        )
        .route(
            "/api/assessments/:job_id",
            get(get_assessment_handler::<S, F>).put(save_assessment_handler::<S, F>),
        )
        .route(
            "/api/assessments/:job_id/submit",
            post(submit_response_handler::<S, F>),
        )
        .with_state(service)
        .layer(middleware::from_fn_with_state(latency, simulate_latency))
}

async fn simulate_latency(
    State(latency): State<LatencyPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let delay = latency.sample();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    next.run(request).await
}

fn failure_response(err: ServiceError) -> Response {
    let status = match &err {
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        ServiceError::InjectedFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Repository(_) => {
            error!(error = %err, "hiring store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T>(result: Result<T, ServiceError>, render: impl FnOnce(T) -> Response) -> Response {
    match result {
        Ok(value) => render(value),
        Err(err) => failure_response(err),
    }
}

pub(crate) async fn list_jobs_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.list_jobs(), |jobs| {
        Json(json!({ "jobs": jobs })).into_response()
    })
}

pub(crate) async fn create_job_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Json(draft): Json<JobDraft>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.create_job(draft), |job| {
        (StatusCode::CREATED, Json(json!({ "job": job }))).into_response()
    })
}

pub(crate) async fn update_job_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.update_job(&id, patch), |job| {
        Json(json!({ "job": job })).into_response()
    })
}

pub(crate) async fn reorder_job_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.reorder_job(&id, request.order), |()| {
        Json(json!({ "ok": true })).into_response()
    })
}

pub(crate) async fn list_candidates_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.list_candidates(), |candidates| {
        Json(json!({ "candidates": candidates })).into_response()
    })
}

pub(crate) async fn get_candidate_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.get_candidate(&id), |candidate| {
        Json(json!({ "candidate": candidate })).into_response()
    })
}

pub(crate) async fn update_candidate_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(id): Path<String>,
    Json(patch): Json<CandidatePatch>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.update_candidate(&id, patch), |candidate| {
        Json(json!({ "candidate": candidate })).into_response()
    })
}

pub(crate) async fn timeline_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.candidate_timeline(&id), |timeline| {
        Json(json!({ "timeline": timeline })).into_response()
    })
}

pub(crate) async fn get_assessment_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(job_id): Path<String>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.get_assessment(&job_id), |assessment| {
        Json(json!({ "assessment": assessment })).into_response()
    })
}

pub(crate) async fn save_assessment_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(job_id): Path<String>,
    Json(assessment): Json<Assessment>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.save_assessment(&job_id, assessment), |assessment| {
        Json(json!({ "assessment": assessment })).into_response()
    })
}

pub(crate) async fn submit_response_handler<S, F>(
    State(service): State<Arc<HiringService<S, F>>>,
    Path(job_id): Path<String>,
    Json(answers): Json<AnswerMap>,
) -> Response
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    respond(service.submit_response(&job_id, answers), |()| {
        Json(json!({ "ok": true })).into_response()
    })
}
