//! End-to-end scenarios for the jobs board driving the in-process API.
//!
//! Every scenario runs the client containers against the real router through
//! `LocalTransport`, with latency disabled and faults controlled per test.

mod common {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use talentflow::client::{ApiClient, JobsBoard, LocalTransport};
    use talentflow::hiring::{
        hiring_router, FaultInjector, FaultPolicy, HiringService, LatencyPolicy, Operation,
        SeedPlan,
    };
    use talentflow::storage::MemoryStore;

    pub(super) type Backend<F> = Arc<HiringService<MemoryStore, F>>;

    pub(super) fn plan() -> SeedPlan {
        SeedPlan {
            jobs: 3,
            candidates: 5,
            seed: Some(11),
        }
    }

    pub(super) fn backend<F: FaultInjector + 'static>(faults: F) -> Backend<F> {
        Arc::new(
            HiringService::open(Arc::new(MemoryStore::new()), &plan(), Arc::new(faults))
                .expect("backend opens"),
        )
    }

    pub(super) fn board<F: FaultInjector + 'static>(
        backend: &Backend<F>,
    ) -> JobsBoard<LocalTransport> {
        let router = hiring_router(backend.clone(), LatencyPolicy::none());
        JobsBoard::new(Arc::new(ApiClient::new(LocalTransport::new(router))))
    }

    pub(super) fn no_faults() -> FaultPolicy {
        FaultPolicy::disabled()
    }

    pub(super) fn failing_reorders() -> FaultPolicy {
        FaultPolicy::always([Operation::ReorderJob])
    }

    /// Fails only the `nth` reorder call (1-based) it sees.
    #[derive(Default)]
    pub(super) struct NthReorderFails {
        nth: usize,
        seen: AtomicUsize,
    }

    impl NthReorderFails {
        pub(super) fn new(nth: usize) -> Self {
            Self {
                nth,
                seen: AtomicUsize::new(0),
            }
        }
    }

    impl FaultInjector for NthReorderFails {
        fn should_fail(&self, operation: Operation) -> bool {
            if operation != Operation::ReorderJob {
                return false;
            }
            self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.nth
        }
    }
}

use common::*;
use talentflow::hiring::{JobDraft, JobStatus};

fn layout(jobs: &[talentflow::hiring::Job]) -> Vec<(String, u32)> {
    jobs.iter().map(|job| (job.id.clone(), job.order)).collect()
}

fn persisted<F: talentflow::hiring::FaultInjector + 'static>(
    backend: &Backend<F>,
) -> Vec<(String, u32)> {
    let mut jobs = backend.list_jobs().expect("server jobs");
    jobs.sort_by_key(|job| job.order);
    layout(&jobs)
}

#[tokio::test]
async fn moving_the_last_job_first_persists_dense_orders() {
    let backend = backend(no_faults());
    let mut board = board(&backend);
    board.load().await;
    assert!(!board.loading());

    let moved = board.move_job(2, 0).await.expect("reorder confirmed");
    assert!(moved);

    let expected = vec![
        ("3".to_string(), 0),
        ("1".to_string(), 1),
        ("2".to_string(), 2),
    ];
    assert_eq!(layout(board.jobs()), expected);
    assert_eq!(persisted(&backend), expected);
}

#[tokio::test]
async fn rejected_reorder_rolls_back_to_the_server_order() {
    let backend = backend(failing_reorders());
    let mut board = board(&backend);
    board.load().await;
    let before = layout(board.jobs());

    let err = board.move_job(0, 2).await.expect_err("reorder rejected");
    assert_eq!(err.status().map(|status| status.as_u16()), Some(500));

    assert_eq!(layout(board.jobs()), before);
    assert_eq!(layout(board.jobs()), persisted(&backend));
}

#[tokio::test]
async fn partial_failure_shows_the_servers_mixed_state() {
    let backend = backend(NthReorderFails::new(2));
    let mut board = board(&backend);
    board.load().await;

    assert!(board.move_job(2, 0).await.is_err());
    assert_eq!(layout(board.jobs()), persisted(&backend));
}

#[tokio::test]
async fn noop_moves_send_nothing() {
    let backend = backend(failing_reorders());
    let mut board = board(&backend);
    board.load().await;

    assert!(!board.move_job(1, 1).await.expect("noop"));
    assert!(!board.move_job(0, 9).await.expect("out of range"));
}

#[tokio::test]
async fn created_jobs_append_at_the_end() {
    let backend = backend(no_faults());
    let mut board = board(&backend);
    board.load().await;

    let job = board
        .create(JobDraft {
            title: "Staff Site Reliability Engineer".to_string(),
            ..JobDraft::default()
        })
        .await
        .expect("created");

    assert_eq!(job.order, 3);
    assert_eq!(job.status, JobStatus::Active);
    assert_eq!(board.jobs().last().map(|job| job.order), Some(3));
    assert_eq!(backend.list_jobs().expect("jobs").len(), 4);
}

#[tokio::test]
async fn archive_toggle_round_trips() {
    let backend = backend(no_faults());
    let mut board = board(&backend);
    board.load().await;
    let id = board.jobs()[0].id.clone();
    let start = board.jobs()[0].status;

    let flipped = board.toggle_archive(&id).await.expect("toggled");
    assert_eq!(flipped.status, start.toggled());
    let restored = board.toggle_archive(&id).await.expect("toggled back");
    assert_eq!(restored.status, start);
}
