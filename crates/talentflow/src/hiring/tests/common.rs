use std::io;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::hiring::faults::{FaultPolicy, LatencyPolicy, Operation};
use crate::hiring::{hiring_router, HiringService, SeedPlan};
use crate::storage::{KeyValueStore, MemoryStore, StoreError};

pub(super) fn small_plan() -> SeedPlan {
    SeedPlan {
        jobs: 3,
        candidates: 12,
        seed: Some(42),
    }
}

pub(super) fn build_service() -> (HiringService<MemoryStore, FaultPolicy>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = HiringService::open(
        store.clone(),
        &small_plan(),
        Arc::new(FaultPolicy::disabled()),
    )
    .expect("service opens");
    (service, store)
}

pub(super) fn failing_service(
    operation: Operation,
) -> HiringService<MemoryStore, FaultPolicy> {
    HiringService::open(
        Arc::new(MemoryStore::new()),
        &small_plan(),
        Arc::new(FaultPolicy::always([operation])),
    )
    .expect("service opens")
}

pub(super) fn router_with_service(
    service: HiringService<MemoryStore, FaultPolicy>,
) -> axum::Router {
    router_with_latency(service, LatencyPolicy::none())
}

pub(super) fn router_with_latency(
    service: HiringService<MemoryStore, FaultPolicy>,
    latency: LatencyPolicy,
) -> axum::Router {
    hiring_router(Arc::new(service), latency)
}

/// Reads succeed; every write fails once the collections are seeded.
#[derive(Default)]
pub(super) struct SealedStore {
    inner: MemoryStore,
    sealed: std::sync::atomic::AtomicBool,
}

impl SealedStore {
    pub(super) fn seal(&self) {
        self.sealed.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

impl KeyValueStore for SealedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.sealed.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Io {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "disk is read only"),
            });
        }
        self.inner.set(key, value)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
