use std::sync::Arc;

use tracing::info;

use super::domain::{Assessment, AssessmentResponse, Candidate, Job};
use super::seed::{generate_candidates, generate_jobs, SeedPlan};
use crate::storage::{Collection, KeyValueStore, Record, RepositoryError};

pub const JOBS_KEY: &str = "talentflow_jobs_v1";
pub const CANDIDATES_KEY: &str = "talentflow_candidates_v1";
pub const ASSESSMENTS_KEY: &str = "talentflow_assessments_v1";
pub const RESPONSES_KEY: &str = "talentflow_assessment_responses_v1";

impl Record for Job {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Candidate {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for Assessment {
    fn key(&self) -> &str {
        &self.job_id
    }
}

/// The four durable collections behind the hiring API.
pub struct HiringStore<S> {
    pub jobs: Collection<Job, S>,
    pub candidates: Collection<Candidate, S>,
    pub assessments: Collection<Assessment, S>,
    pub responses: Collection<AssessmentResponse, S>,
}

impl<S: KeyValueStore> HiringStore<S> {
    /// Load every collection, seeding jobs and candidates when they are empty.
    pub fn open(store: Arc<S>, plan: &SeedPlan) -> Result<Self, RepositoryError> {
        let jobs = Collection::load(JOBS_KEY, store.clone())?;
        let candidates = Collection::load(CANDIDATES_KEY, store.clone())?;
        let assessments = Collection::load(ASSESSMENTS_KEY, store.clone())?;
        let responses = Collection::load(RESPONSES_KEY, store)?;
        let mut rng = plan.rng();

        if jobs.is_empty()? {
            let seeded = generate_jobs(&mut rng, plan.jobs);
            info!(count = seeded.len(), "seeding jobs");
            jobs.replace_all(seeded)?;
        }

        if candidates.is_empty()? {
            let job_ids: Vec<String> = jobs.all()?.into_iter().map(|job| job.id).collect();
            let seeded = generate_candidates(&mut rng, plan.candidates, &job_ids);
            info!(count = seeded.len(), "seeding candidates");
            candidates.replace_all(seeded)?;
        }

        Ok(Self {
            jobs,
            candidates,
            assessments,
            responses,
        })
    }
}
