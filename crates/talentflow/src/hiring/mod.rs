//! Simulated hiring backend: jobs, candidates, and per-job assessments served
//! over an HTTP-shaped API with artificial latency and injectable faults.

pub mod builder;
pub mod domain;
pub mod faults;
pub mod router;
pub mod runtime;
pub mod seed;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use builder::BuilderError;
pub use domain::{
    AnswerMap, Assessment, AssessmentResponse, Candidate, CandidatePatch, DisplayCondition, Job,
    JobDraft, JobPatch, JobStatus, Question, QuestionKind, ReorderRequest, Section, Stage,
    TimelineEntry,
};
pub use faults::{FaultInjector, FaultPolicy, LatencyPolicy, Operation};
pub use router::hiring_router;
pub use runtime::{FormField, FormLayout, InputWidget, ResponseSheet};
pub use seed::SeedPlan;
pub use service::{HiringService, ServiceError};
pub use store::HiringStore;
