use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use super::{ApiClient, ClientError, Transport};
use crate::hiring::domain::{Candidate, CandidatePatch, Stage, TimelineEntry};

/// Search text (name or email) AND an optional stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub search: String,
    pub stage: Option<Stage>,
}

impl CandidateFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || candidate.name.to_lowercase().contains(&needle)
            || candidate.email.to_lowercase().contains(&needle);
        let matches_stage = self.stage.map_or(true, |stage| candidate.stage == stage);
        matches_search && matches_stage
    }
}

/// Incremental rendering window: a first page, then fixed increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealWindow {
    visible: usize,
}

impl RevealWindow {
    pub const INITIAL: usize = 40;
    pub const STEP: usize = 30;

    pub fn new() -> Self {
        Self {
            visible: Self::INITIAL,
        }
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Grow by one step, never past `total`.
    pub fn reveal_more(&mut self, total: usize) {
        self.visible = (self.visible + Self::STEP).min(total);
    }

    pub fn reset(&mut self) {
        self.visible = Self::INITIAL;
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible.min(items.len())]
    }
}

impl Default for RevealWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only state behind the candidates list.
pub struct CandidatesBoard<T> {
    client: Arc<ApiClient<T>>,
    loading: bool,
    candidates: Vec<Candidate>,
}

impl<T: Transport> CandidatesBoard<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            loading: true,
            candidates: Vec::new(),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub async fn load(&mut self) {
        self.loading = true;
        self.candidates = match self.client.list_candidates().await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(error = %err, "failed to fetch candidates");
                Vec::new()
            }
        };
        self.loading = false;
    }

    pub fn filter(&self, filter: &CandidateFilter) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|candidate| filter.matches(candidate))
            .collect()
    }
}

/// A single candidate and their synthetic timeline.
pub struct CandidateProfile<T> {
    client: Arc<ApiClient<T>>,
    candidate: Option<Candidate>,
    timeline: Vec<TimelineEntry>,
}

impl<T: Transport> CandidateProfile<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            candidate: None,
            timeline: Vec::new(),
        }
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        self.candidate.as_ref()
    }

    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    /// Load the candidate, then the timeline. A missing candidate leaves the
    /// profile empty; other failures propagate.
    pub async fn load(&mut self, id: &str) -> Result<(), ClientError> {
        self.candidate = None;
        self.timeline.clear();
        let candidate = match self.client.get_candidate(id).await {
            Ok(candidate) => candidate,
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(err),
        };
        self.timeline = self.client.candidate_timeline(&candidate.id).await?;
        self.candidate = Some(candidate);
        Ok(())
    }

    pub async fn set_stage(&mut self, stage: Stage) -> Result<Candidate, ClientError> {
        let Some(current) = self.candidate.as_ref() else {
            return Err(ClientError::Transport("no candidate loaded".to_string()));
        };
        let patch = CandidatePatch {
            stage: Some(stage),
            ..CandidatePatch::default()
        };
        let updated = self.client.update_candidate(&current.id, &patch).await?;
        self.candidate = Some(updated.clone());
        Ok(updated)
    }
}

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    stage: &'static str,
    job_id: &'a str,
}

/// Write `candidates` as CSV with a header row. Returns the number of rows.
pub fn export_candidates<'a, W: Write>(
    writer: W,
    candidates: impl IntoIterator<Item = &'a Candidate>,
) -> Result<usize, csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut rows = 0;
    for candidate in candidates {
        csv_writer.serialize(ExportRow {
            id: &candidate.id,
            name: &candidate.name,
            email: &candidate.email,
            stage: candidate.stage.label(),
            job_id: candidate.job_id.as_deref().unwrap_or(""),
        })?;
        rows += 1;
    }
    csv_writer.flush()?;
    Ok(rows)
}
