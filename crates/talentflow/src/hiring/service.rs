use std::sync::Arc;

use chrono::{Local, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::domain::{
    slugify, AnswerMap, Assessment, AssessmentResponse, Candidate, CandidatePatch, Job, JobDraft,
    JobPatch, JobStatus, TimelineEntry,
};
use super::faults::{FaultInjector, Operation};
use super::seed::{generate_timeline, SeedPlan};
use super::store::HiringStore;
use crate::storage::{KeyValueStore, RepositoryError};

/// Backend operations over the hiring collections.
pub struct HiringService<S, F> {
    store: HiringStore<S>,
    faults: Arc<F>,
}

impl<S, F> HiringService<S, F>
where
    S: KeyValueStore + 'static,
    F: FaultInjector + 'static,
{
    pub fn new(store: HiringStore<S>, faults: Arc<F>) -> Self {
        Self { store, faults }
    }

    /// Open (and seed if needed) the collections behind `store`.
    pub fn open(store: Arc<S>, plan: &SeedPlan, faults: Arc<F>) -> Result<Self, ServiceError> {
        let store = HiringStore::open(store, plan)?;
        Ok(Self::new(store, faults))
    }

    pub fn store(&self) -> &HiringStore<S> {
        &self.store
    }

    fn guard(&self, operation: Operation) -> Result<(), ServiceError> {
        if self.faults.should_fail(operation) {
            warn!(%operation, "injecting synthetic failure");
            return Err(ServiceError::InjectedFault(operation));
        }
        Ok(())
    }

    pub fn list_jobs(&self) -> Result<Vec<Job>, ServiceError> {
        self.guard(Operation::ListJobs)?;
        Ok(self.store.jobs.all()?)
    }

    /// Fill the gaps in `draft` and store the new job.
    pub fn create_job(&self, draft: JobDraft) -> Result<Job, ServiceError> {
        self.guard(Operation::CreateJob)?;
        let JobDraft {
            id,
            title,
            slug,
            status,
            tags,
            order,
        } = draft;

        let order = match order {
            Some(order) => order,
            None => self.store.jobs.len()? as u32,
        };
        let job = Job {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            slug: slug.unwrap_or_else(|| slugify(&title)),
            title,
            status: status.unwrap_or(JobStatus::Active),
            tags,
            order,
        };

        let stored = self.store.jobs.insert(job)?;
        info!(job_id = %stored.id, order = stored.order, "job created");
        Ok(stored)
    }

    pub fn update_job(&self, id: &str, patch: JobPatch) -> Result<Job, ServiceError> {
        self.guard(Operation::UpdateJob)?;
        let updated = self
            .store
            .jobs
            .patch(id, |job| job.apply(patch))?
            .ok_or_else(|| ServiceError::not_found("job", id))?;
        debug!(job_id = %id, "job updated");
        Ok(updated)
    }

    /// Move a single job to `order`. This is the one call the default fault
    /// policy targets.
    pub fn reorder_job(&self, id: &str, order: u32) -> Result<(), ServiceError> {
        self.guard(Operation::ReorderJob)?;
        self.store
            .jobs
            .patch(id, |job| job.order = order)?
            .ok_or_else(|| ServiceError::not_found("job", id))?;
        debug!(job_id = %id, order, "job reordered");
        Ok(())
    }

    pub fn list_candidates(&self) -> Result<Vec<Candidate>, ServiceError> {
        self.guard(Operation::ListCandidates)?;
        Ok(self.store.candidates.all()?)
    }

    pub fn get_candidate(&self, id: &str) -> Result<Candidate, ServiceError> {
        self.guard(Operation::GetCandidate)?;
        self.store
            .candidates
            .get(id)?
            .ok_or_else(|| ServiceError::not_found("candidate", id))
    }

    pub fn update_candidate(
        &self,
        id: &str,
        patch: CandidatePatch,
    ) -> Result<Candidate, ServiceError> {
        self.guard(Operation::UpdateCandidate)?;
        let updated = self
            .store
            .candidates
            .patch(id, |candidate| candidate.apply(patch))?
            .ok_or_else(|| ServiceError::not_found("candidate", id))?;
        info!(candidate_id = %id, stage = %updated.stage, "candidate updated");
        Ok(updated)
    }

    /// A fresh synthetic timeline; nothing is recorded.
    pub fn candidate_timeline(&self, id: &str) -> Result<Vec<TimelineEntry>, ServiceError> {
        self.guard(Operation::CandidateTimeline)?;
        if !self.store.candidates.contains(id)? {
            return Err(ServiceError::not_found("candidate", id));
        }
        let today = Local::now().date_naive();
        Ok(generate_timeline(&mut rand::thread_rng(), today))
    }

    /// The stored assessment, or an empty one that is not persisted.
    pub fn get_assessment(&self, job_id: &str) -> Result<Assessment, ServiceError> {
        self.guard(Operation::GetAssessment)?;
        Ok(self
            .store
            .assessments
            .get(job_id)?
            .unwrap_or_else(|| Assessment::empty(job_id)))
    }

    /// Overwrite the assessment for `job_id`. The path id wins over the body.
    pub fn save_assessment(
        &self,
        job_id: &str,
        mut assessment: Assessment,
    ) -> Result<Assessment, ServiceError> {
        self.guard(Operation::SaveAssessment)?;
        if assessment.job_id != job_id {
            debug!(path = %job_id, body = %assessment.job_id, "assessment key taken from path");
            assessment.job_id = job_id.to_string();
        }
        let stored = self.store.assessments.put(assessment)?;
        info!(
            job_id = %stored.job_id,
            sections = stored.sections.len(),
            questions = stored.question_count(),
            "assessment saved"
        );
        Ok(stored)
    }

    pub fn submit_response(&self, job_id: &str, answers: AnswerMap) -> Result<(), ServiceError> {
        self.guard(Operation::SubmitResponse)?;
        let answered = answers.len();
        self.store.responses.append(AssessmentResponse {
            job_id: job_id.to_string(),
            response: answers,
            date: Utc::now(),
        })?;
        info!(%job_id, answered, "assessment response recorded");
        Ok(())
    }
}

/// Error raised by the hiring service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("random failure injected into {0}")]
    InjectedFault(Operation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
