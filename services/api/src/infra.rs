use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use talentflow::config::AppConfig;
use talentflow::error::AppError;
use talentflow::hiring::{hiring_router, FaultPolicy, HiringService, LatencyPolicy, SeedPlan};
use talentflow::storage::{FileStore, KeyValueStore, MemoryStore};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Store picked at startup: a directory of JSON files or process memory.
pub(crate) type DynStore = Box<dyn KeyValueStore>;

pub(crate) type Backend = Arc<HiringService<DynStore, FaultPolicy>>;

pub(crate) fn open_store(config: &AppConfig) -> Result<Arc<DynStore>, AppError> {
    let store: DynStore = match &config.storage.data_dir {
        Some(dir) => {
            info!(data_dir = %dir.display(), "using file store");
            Box::new(FileStore::open(dir.clone())?)
        }
        None => {
            info!("using in-memory store");
            Box::new(MemoryStore::new())
        }
    };
    Ok(Arc::new(store))
}

pub(crate) fn seed_plan(config: &AppConfig) -> SeedPlan {
    SeedPlan {
        jobs: config.simulation.seed_jobs,
        candidates: config.simulation.seed_candidates,
        seed: config.simulation.seed,
    }
}

pub(crate) fn latency_policy(config: &AppConfig) -> LatencyPolicy {
    let (min, max) = config.simulation.latency_window();
    LatencyPolicy::new(min, max)
}

/// Open the store, seed it if empty, and wire the stock fault policy.
pub(crate) fn open_backend(config: &AppConfig) -> Result<Backend, AppError> {
    let store = open_store(config)?;
    let faults = FaultPolicy::reorder_only(
        config.simulation.reorder_failure_rate,
        config.simulation.seed,
    );
    let service = HiringService::open(store, &seed_plan(config), Arc::new(faults))?;
    Ok(Arc::new(service))
}

pub(crate) fn api_router(backend: Backend, config: &AppConfig) -> axum::Router {
    hiring_router(backend, latency_policy(config))
}

#[cfg(test)]
pub(crate) fn quiet_config(data_dir: Option<std::path::PathBuf>) -> AppConfig {
    use talentflow::config::{
        AppEnvironment, ServerConfig, SimulationConfig, StorageConfig, TelemetryConfig,
    };

    AppConfig {
        environment: AppEnvironment::Test,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        telemetry: TelemetryConfig {
            log_level: "warn".to_string(),
        },
        storage: StorageConfig { data_dir },
        simulation: SimulationConfig::quiet(),
    }
}
