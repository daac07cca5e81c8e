use std::collections::BTreeSet;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Backend operations a fault policy can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    ListJobs,
    CreateJob,
    UpdateJob,
    ReorderJob,
    ListCandidates,
    GetCandidate,
    UpdateCandidate,
    CandidateTimeline,
    GetAssessment,
    SaveAssessment,
    SubmitResponse,
}

impl Operation {
    pub const fn label(self) -> &'static str {
        match self {
            Operation::ListJobs => "list_jobs",
            Operation::CreateJob => "create_job",
            Operation::UpdateJob => "update_job",
            Operation::ReorderJob => "reorder_job",
            Operation::ListCandidates => "list_candidates",
            Operation::GetCandidate => "get_candidate",
            Operation::UpdateCandidate => "update_candidate",
            Operation::CandidateTimeline => "candidate_timeline",
            Operation::GetAssessment => "get_assessment",
            Operation::SaveAssessment => "save_assessment",
            Operation::SubmitResponse => "submit_response",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decides whether a backend call should fail with a synthetic error.
pub trait FaultInjector: Send + Sync {
    fn should_fail(&self, operation: Operation) -> bool;
}

/// Probability-based fault injection restricted to a set of operations.
pub struct FaultPolicy {
    rate: f64,
    affected: BTreeSet<Operation>,
    rng: Mutex<StdRng>,
}

impl FaultPolicy {
    pub fn new(
        rate: f64,
        affected: impl IntoIterator<Item = Operation>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rate = if rate.is_finite() {
            rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            rate,
            affected: affected.into_iter().collect(),
            rng: Mutex::new(rng),
        }
    }

    /// The stock behavior: only job reorders fail, at `rate`.
    pub fn reorder_only(rate: f64, seed: Option<u64>) -> Self {
        Self::new(rate, [Operation::ReorderJob], seed)
    }

    pub fn disabled() -> Self {
        Self::new(0.0, std::iter::empty(), Some(0))
    }

    pub fn always(affected: impl IntoIterator<Item = Operation>) -> Self {
        Self::new(1.0, affected, Some(0))
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn affects(&self, operation: Operation) -> bool {
        self.affected.contains(&operation)
    }
}

impl fmt::Debug for FaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaultPolicy")
            .field("rate", &self.rate)
            .field("affected", &self.affected)
            .finish_non_exhaustive()
    }
}

impl FaultInjector for FaultPolicy {
    fn should_fail(&self, operation: Operation) -> bool {
        if self.rate <= 0.0 || !self.affects(operation) {
            return false;
        }
        if self.rate >= 1.0 {
            return true;
        }
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_bool(self.rate),
            Err(_) => false,
        }
    }
}

/// Uniform artificial delay applied to every API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyPolicy {
    min: Duration,
    max: Duration,
}

impl LatencyPolicy {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min > max {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    pub fn sample(&self) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl Default for LatencyPolicy {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(1000))
    }
}
