use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::domain::{Candidate, Job, JobStatus, Stage, TimelineEntry};

const TAG_POOL: [&str; 5] = ["frontend", "backend", "design", "ml", "product"];

const TITLE_WORDS: [&str; 24] = [
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed",
    "tempor", "incididunt", "labore", "magna", "aliqua", "veniam", "nostrud", "ullamco",
    "laboris", "commodo", "consequat", "aute", "irure", "velit", "esse",
];

const FIRST_NAMES: [&str; 20] = [
    "Ada", "Grace", "Linus", "Margaret", "Alan", "Barbara", "Ken", "Radia", "Dennis", "Frances",
    "Edsger", "Hedy", "Donald", "Katherine", "Niklaus", "Anita", "Bjarne", "Shafi", "Tim",
    "Sophie",
];

const LAST_NAMES: [&str; 20] = [
    "Lovelace", "Hopper", "Torvalds", "Hamilton", "Turing", "Liskov", "Thompson", "Perlman",
    "Ritchie", "Allen", "Dijkstra", "Lamarr", "Knuth", "Johnson", "Wirth", "Borg", "Stroustrup",
    "Goldwasser", "Berners-Lee", "Wilson",
];

const MAIL_DOMAINS: [&str; 4] = ["example.com", "mail.test", "talent.dev", "inbox.io"];

const TIMELINE_LENGTH: usize = 4;
const TIMELINE_LOOKBACK_DAYS: i64 = 30;

/// How much synthetic data to generate for empty collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedPlan {
    pub jobs: usize,
    pub candidates: usize,
    pub seed: Option<u64>,
}

impl SeedPlan {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            jobs: 10,
            candidates: 1000,
            seed: None,
        }
    }
}

/// Jobs `"1"..="n"` with three-word titles, dense `order`, ~80% active.
pub fn generate_jobs<R: Rng>(rng: &mut R, count: usize) -> Vec<Job> {
    (0..count)
        .map(|index| {
            let title = TITLE_WORDS
                .choose_multiple(rng, 3)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            let slug = format!("{}-{index}", title.to_lowercase().replace(' ', "-"));
            let status = if rng.gen_bool(0.8) {
                JobStatus::Active
            } else {
                JobStatus::Archived
            };
            let tags = TAG_POOL
                .choose_multiple(rng, 2)
                .map(|tag| tag.to_string())
                .collect();

            Job {
                id: (index + 1).to_string(),
                title,
                slug,
                status,
                tags,
                order: index as u32,
            }
        })
        .collect()
}

/// Candidates `"1"..="n"` spread uniformly over stages and the given jobs.
pub fn generate_candidates<R: Rng>(rng: &mut R, count: usize, job_ids: &[String]) -> Vec<Candidate> {
    (0..count)
        .map(|index| {
            let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
            let last = LAST_NAMES.choose(rng).copied().unwrap_or("Doe");
            let domain = MAIL_DOMAINS.choose(rng).copied().unwrap_or("example.com");
            let email = format!(
                "{}.{}{}@{domain}",
                first.to_lowercase(),
                last.to_lowercase(),
                rng.gen_range(1..100)
            );
            let stage = Stage::ALL.choose(rng).copied().unwrap_or(Stage::Applied);

            Candidate {
                id: (index + 1).to_string(),
                name: format!("{first} {last}"),
                email,
                stage,
                job_id: job_ids.choose(rng).cloned(),
            }
        })
        .collect()
}

/// Four made-up pipeline events dated within the month before `today`.
pub fn generate_timeline<R: Rng>(rng: &mut R, today: NaiveDate) -> Vec<TimelineEntry> {
    (0..TIMELINE_LENGTH)
        .map(|index| TimelineEntry {
            id: index.to_string(),
            stage: Stage::ALL.choose(rng).copied().unwrap_or(Stage::Applied),
            date: today - Duration::days(rng.gen_range(0..=TIMELINE_LOOKBACK_DAYS)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn jobs_are_densely_ordered_with_distinct_tags() {
        let mut rng = StdRng::seed_from_u64(3);
        let jobs = generate_jobs(&mut rng, 10);
        assert_eq!(jobs.len(), 10);
        for (index, job) in jobs.iter().enumerate() {
            assert_eq!(job.order as usize, index);
            assert_eq!(job.id, (index + 1).to_string());
            assert!(job.slug.ends_with(&format!("-{index}")));
            assert_eq!(job.title.split(' ').count(), 3);
            let tags: BTreeSet<_> = job.tags.iter().collect();
            assert_eq!(tags.len(), 2);
        }
    }

    #[test]
    fn candidates_reference_seeded_jobs() {
        let mut rng = StdRng::seed_from_u64(5);
        let job_ids = vec!["1".to_string(), "2".to_string()];
        let candidates = generate_candidates(&mut rng, 25, &job_ids);
        assert_eq!(candidates.len(), 25);
        assert!(candidates
            .iter()
            .all(|c| c.job_id.as_ref().is_some_and(|id| job_ids.contains(id))));
        assert!(candidates.iter().all(|c| c.email.contains('@')));
    }

    #[test]
    fn timeline_stays_within_lookback() {
        let mut rng = StdRng::seed_from_u64(9);
        let today = NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date");
        let timeline = generate_timeline(&mut rng, today);
        assert_eq!(timeline.len(), 4);
        assert!(timeline
            .iter()
            .all(|entry| entry.date <= today && entry.date >= today - Duration::days(30)));
    }
}
