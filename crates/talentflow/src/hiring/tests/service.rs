use super::common::*;
use std::sync::Arc;

use serde_json::json;

use crate::hiring::domain::{
    AnswerMap, Assessment, CandidatePatch, JobDraft, JobPatch, JobStatus, Stage,
};
use crate::hiring::faults::{FaultPolicy, Operation};
use crate::hiring::store::JOBS_KEY;
use crate::hiring::{HiringService, ServiceError};
use crate::storage::{KeyValueStore, RepositoryError};

#[test]
fn open_seeds_dense_job_orders_once() {
    let (service, store) = build_service();
    let jobs = service.list_jobs().expect("jobs");
    let layout: Vec<(&str, u32)> = jobs.iter().map(|job| (job.id.as_str(), job.order)).collect();
    assert_eq!(layout, vec![("1", 0), ("2", 1), ("3", 2)]);
    assert_eq!(service.list_candidates().expect("candidates").len(), 12);

    let reopened = HiringService::open(
        store,
        &small_plan(),
        Arc::new(FaultPolicy::disabled()),
    )
    .expect("reopen");
    assert_eq!(reopened.list_jobs().expect("jobs"), jobs);
}

#[test]
fn create_job_defaults_order_to_current_count() {
    let (service, _) = build_service();
    let job = service
        .create_job(JobDraft {
            title: "Platform Rust Engineer".to_string(),
            tags: vec!["rust".to_string()],
            ..JobDraft::default()
        })
        .expect("created");

    assert_eq!(job.order, 3);
    assert_eq!(job.slug, "platform-rust-engineer");
    assert_eq!(job.status, JobStatus::Active);
    assert!(!job.id.is_empty());
    assert_eq!(service.list_jobs().expect("jobs").len(), 4);
}

#[test]
fn create_job_rejects_duplicate_ids() {
    let (service, _) = build_service();
    match service.create_job(JobDraft {
        id: Some("1".to_string()),
        title: "Duplicate".to_string(),
        ..JobDraft::default()
    }) {
        Err(ServiceError::Repository(RepositoryError::Conflict(id))) => assert_eq!(id, "1"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn update_job_merges_and_persists() {
    let (service, store) = build_service();
    let updated = service
        .update_job(
            "2",
            JobPatch {
                status: Some(JobStatus::Archived),
                ..JobPatch::default()
            },
        )
        .expect("updated");
    assert_eq!(updated.status, JobStatus::Archived);

    let raw = store.get(JOBS_KEY).expect("read").expect("jobs persisted");
    assert!(raw.contains("archived"));
    match service.update_job("404", JobPatch::default()) {
        Err(ServiceError::NotFound { entity: "job", id }) => assert_eq!(id, "404"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn reorder_applies_the_requested_order() {
    let (service, _) = build_service();
    service.reorder_job("3", 0).expect("reorder 3");
    service.reorder_job("1", 1).expect("reorder 1");
    service.reorder_job("2", 2).expect("reorder 2");

    let mut jobs = service.list_jobs().expect("jobs");
    jobs.sort_by_key(|job| job.order);
    let ids: Vec<&str> = jobs.iter().map(|job| job.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
}

#[test]
fn injected_faults_fire_before_lookup() {
    let service = failing_service(Operation::ReorderJob);
    match service.reorder_job("missing", 0) {
        Err(ServiceError::InjectedFault(Operation::ReorderJob)) => {}
        other => panic!("expected injected fault, got {other:?}"),
    }
    assert!(service.list_jobs().is_ok());
}

#[test]
fn candidate_stage_changes_are_stored() {
    let (service, _) = build_service();
    let first = service.list_candidates().expect("candidates").remove(0);
    let updated = service
        .update_candidate(
            &first.id,
            CandidatePatch {
                stage: Some(Stage::Offer),
                ..CandidatePatch::default()
            },
        )
        .expect("updated");
    assert_eq!(updated.stage, Stage::Offer);
    assert_eq!(
        service.get_candidate(&first.id).expect("fetch").stage,
        Stage::Offer
    );
}

#[test]
fn timeline_requires_a_known_candidate() {
    let (service, _) = build_service();
    let first = service.list_candidates().expect("candidates").remove(0);
    assert_eq!(service.candidate_timeline(&first.id).expect("timeline").len(), 4);
    assert!(matches!(
        service.candidate_timeline("nobody"),
        Err(ServiceError::NotFound {
            entity: "candidate",
            ..
        })
    ));
}

#[test]
fn missing_assessment_is_empty_and_not_persisted() {
    let (service, _) = build_service();
    let assessment = service.get_assessment("2").expect("assessment");
    assert_eq!(assessment, Assessment::empty("2"));
    assert!(service.store().assessments.is_empty().expect("count"));
}

#[test]
fn saved_assessment_is_keyed_by_path() {
    let (service, _) = build_service();
    let draft = Assessment::empty("ignored").add_section(Some("Experience"));
    let section_id = draft.sections[0].id.clone();
    let draft = draft.add_question(&section_id).expect("question");

    let stored = service.save_assessment("1", draft.clone()).expect("saved");
    assert_eq!(stored.job_id, "1");
    let fetched = service.get_assessment("1").expect("fetched");
    assert_eq!(fetched.sections, draft.sections);

    let replaced = service
        .save_assessment("1", Assessment::empty("1"))
        .expect("replaced");
    assert!(replaced.sections.is_empty());
    assert_eq!(service.store().assessments.len().expect("count"), 1);
}

#[test]
fn submissions_leave_the_schema_untouched() {
    let (service, _) = build_service();
    let schema = Assessment::empty("3").add_section(None);
    service.save_assessment("3", schema.clone()).expect("saved");

    let mut answers = AnswerMap::new();
    answers.insert("q1".to_string(), json!("five years"));
    service.submit_response("3", answers.clone()).expect("submitted");
    service.submit_response("3", AnswerMap::new()).expect("submitted");

    assert_eq!(service.get_assessment("3").expect("fetched"), schema);
    let responses = service.store().responses.all().expect("responses");
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].response, answers);
    assert_eq!(responses[0].job_id, "3");
}

#[test]
fn store_write_failures_surface_as_repository_errors() {
    let store = Arc::new(SealedStore::default());
    let service = HiringService::open(
        store.clone(),
        &small_plan(),
        Arc::new(FaultPolicy::disabled()),
    )
    .expect("seeded before sealing");
    store.seal();

    assert!(matches!(
        service.reorder_job("1", 2),
        Err(ServiceError::Repository(RepositoryError::Store(_)))
    ));
    assert_eq!(service.list_jobs().expect("reads still work").len(), 3);
}
