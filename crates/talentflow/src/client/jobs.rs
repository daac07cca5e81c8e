use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, warn};

use super::optimistic::{Settlement, Tentative};
use super::{ApiClient, ClientError, Transport};
use crate::hiring::domain::{Job, JobDraft, JobPatch, JobStatus};

/// State behind the jobs table.
pub struct JobsBoard<T> {
    client: Arc<ApiClient<T>>,
    loading: bool,
    jobs: Vec<Job>,
}

impl<T: Transport> JobsBoard<T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            loading: true,
            jobs: Vec::new(),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Jobs sorted by `order`.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Fetch the list. A failure is logged and leaves the board empty.
    pub async fn load(&mut self) {
        self.loading = true;
        self.jobs = match self.client.list_jobs().await {
            Ok(jobs) => sorted(jobs),
            Err(err) => {
                warn!(error = %err, "failed to fetch jobs");
                Vec::new()
            }
        };
        self.loading = false;
    }

    /// Create a job, defaulting `order` to the current count and the status
    /// to active.
    pub async fn create(&mut self, mut draft: JobDraft) -> Result<Job, ClientError> {
        draft.order.get_or_insert(self.jobs.len() as u32);
        draft.status.get_or_insert(JobStatus::Active);
        let job = self.client.create_job(&draft).await?;
        self.jobs.push(job.clone());
        self.jobs.sort_by_key(|job| job.order);
        Ok(job)
    }

    pub async fn update(&mut self, id: &str, patch: JobPatch) -> Result<Job, ClientError> {
        let updated = self.client.update_job(id, &patch).await?;
        match self.jobs.iter_mut().find(|job| job.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.jobs.push(updated.clone()),
        }
        Ok(updated)
    }

    /// Flip a job between active and archived.
    pub async fn toggle_archive(&mut self, id: &str) -> Result<Job, ClientError> {
        let status = match self.get(id) {
            Some(job) => job.status.toggled(),
            None => JobStatus::Archived,
        };
        self.update(
            id,
            JobPatch {
                status: Some(status),
                ..JobPatch::default()
            },
        )
        .await
    }

    /// Show `next` immediately, then confirm every job's order concurrently.
    ///
    /// If any confirmation fails, local state is replaced by a fresh server
    /// copy (or the pre-reorder list when that fetch fails too) and the first
    /// failure is returned.
    pub async fn reorder(&mut self, next: Vec<Job>) -> Result<(), ClientError> {
        let requests: Vec<(String, u32)> =
            next.iter().map(|job| (job.id.clone(), job.order)).collect();
        let previous = std::mem::replace(&mut self.jobs, next.clone());
        let mut change = Tentative::begin(
            previous,
            next,
            requests.iter().map(|(id, _)| id.clone()),
        );

        let client = &self.client;
        let outcomes = join_all(requests.iter().map(|(id, order)| async move {
            (id.as_str(), client.reorder_job(id, *order).await)
        }))
        .await;
        for (id, outcome) in outcomes {
            change.record(id, outcome);
        }

        match change.settle() {
            Settlement::Committed(jobs) => {
                self.jobs = jobs;
                Ok(())
            }
            Settlement::Resync {
                previous,
                failures,
                ..
            } => {
                // Confirmed moves are already persisted; the reload shows them.
                warn!(failed = failures.len(), "reorder rejected, reloading jobs");
                self.resync(previous).await;
                match failures.into_iter().next() {
                    Some((_, err)) => Err(err),
                    None => Err(ClientError::Transport(
                        "reorder left unconfirmed jobs".to_string(),
                    )),
                }
            }
        }
    }

    /// Drag-equivalent: move the job at `from` to `to` and reorder.
    /// Returns `Ok(false)` when the move is a no-op.
    pub async fn move_job(&mut self, from: usize, to: usize) -> Result<bool, ClientError> {
        match move_job(&self.jobs, from, to) {
            Some(next) => self.reorder(next).await.map(|()| true),
            None => Ok(false),
        }
    }

    pub fn filter(&self, query: &str) -> Vec<&Job> {
        filter_jobs(&self.jobs, query)
    }

    async fn resync(&mut self, fallback: Vec<Job>) {
        self.jobs = match self.client.list_jobs().await {
            Ok(jobs) => sorted(jobs),
            Err(err) => {
                error!(error = %err, "failed to reload jobs after reorder error");
                fallback
            }
        };
    }
}

fn sorted(mut jobs: Vec<Job>) -> Vec<Job> {
    jobs.sort_by_key(|job| job.order);
    jobs
}

/// Move the job at `from` to index `to`, renumbering `order` densely.
/// `None` when either index is out of range or they are equal.
pub fn move_job(jobs: &[Job], from: usize, to: usize) -> Option<Vec<Job>> {
    if from == to || from >= jobs.len() || to >= jobs.len() {
        return None;
    }
    let mut next = jobs.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    for (index, job) in next.iter_mut().enumerate() {
        job.order = index as u32;
    }
    Some(next)
}

/// Case-insensitive match on title, slug, or the space-joined tags.
pub fn filter_jobs<'a>(jobs: &'a [Job], query: &str) -> Vec<&'a Job> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return jobs.iter().collect();
    }
    jobs.iter()
        .filter(|job| {
            job.title.to_lowercase().contains(&needle)
                || job.slug.to_lowercase().contains(&needle)
                || job.tags.join(" ").to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, order: u32, tags: &[&str]) -> Job {
        Job {
            id: id.to_string(),
            title: format!("Role {id}"),
            slug: format!("role-{id}"),
            status: JobStatus::Active,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            order,
        }
    }

    #[test]
    fn move_job_renumbers_densely() {
        let jobs = vec![job("a", 0, &[]), job("b", 1, &[]), job("c", 2, &[])];
        let next = move_job(&jobs, 2, 0).expect("move applies");
        let layout: Vec<(&str, u32)> = next.iter().map(|j| (j.id.as_str(), j.order)).collect();
        assert_eq!(layout, vec![("c", 0), ("a", 1), ("b", 2)]);
    }

    #[test]
    fn move_job_ignores_noops_and_out_of_range() {
        let jobs = vec![job("a", 0, &[]), job("b", 1, &[])];
        assert!(move_job(&jobs, 1, 1).is_none());
        assert!(move_job(&jobs, 0, 5).is_none());
    }

    #[test]
    fn filter_matches_title_slug_and_tags() {
        let jobs = vec![job("1", 0, &["ml", "backend"]), job("2", 1, &["design"])];
        assert_eq!(filter_jobs(&jobs, "DESIGN").len(), 1);
        assert_eq!(filter_jobs(&jobs, "ml back").len(), 1);
        assert_eq!(filter_jobs(&jobs, "role-").len(), 2);
        assert_eq!(filter_jobs(&jobs, "  ").len(), 2);
        assert!(filter_jobs(&jobs, "frontend").is_empty());
    }
}
