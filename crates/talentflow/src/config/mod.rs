use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let data_dir = env::var("APP_DATA_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let latency_min_ms = parse_var("APP_LATENCY_MIN_MS", 300u64)?;
        let latency_max_ms = parse_var("APP_LATENCY_MAX_MS", 1000u64)?;
        if latency_max_ms != 0 && latency_min_ms > latency_max_ms {
            return Err(ConfigError::InvalidLatencyWindow {
                min_ms: latency_min_ms,
                max_ms: latency_max_ms,
            });
        }

        let reorder_failure_rate = parse_var("APP_REORDER_FAILURE_RATE", 0.1f64)?;
        if !(0.0..=1.0).contains(&reorder_failure_rate) {
            return Err(ConfigError::InvalidFailureRate(reorder_failure_rate));
        }

        let seed = match env::var("APP_SEED") {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                variable: "APP_SEED",
                value: raw,
            })?),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage: StorageConfig { data_dir },
            simulation: SimulationConfig {
                latency_min_ms,
                latency_max_ms,
                reorder_failure_rate,
                seed,
                seed_jobs: parse_var("APP_SEED_JOBS", 10usize)?,
                seed_candidates: parse_var("APP_SEED_CANDIDATES", 1000usize)?,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(variable: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber {
                variable,
                value: raw,
            }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Durable store selection. No directory means an in-memory store.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

/// Knobs for the simulated network and the synthetic seed data.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub reorder_failure_rate: f64,
    pub seed: Option<u64>,
    pub seed_jobs: usize,
    pub seed_candidates: usize,
}

impl SimulationConfig {
    pub fn latency_window(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.latency_min_ms),
            Duration::from_millis(self.latency_max_ms),
        )
    }

    /// Zero latency, no faults, small deterministic seed.
    pub fn quiet() -> Self {
        Self {
            latency_min_ms: 0,
            latency_max_ms: 0,
            reorder_failure_rate: 0.0,
            seed: Some(7),
            seed_jobs: 10,
            seed_candidates: 50,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: 300,
            latency_max_ms: 1000,
            reorder_failure_rate: 0.1,
            seed: None,
            seed_jobs: 10,
            seed_candidates: 1000,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
    InvalidLatencyWindow { min_ms: u64, max_ms: u64 },
    InvalidFailureRate(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be numeric (got '{value}')")
            }
            ConfigError::InvalidLatencyWindow { min_ms, max_ms } => write!(
                f,
                "APP_LATENCY_MIN_MS ({min_ms}) must not exceed APP_LATENCY_MAX_MS ({max_ms})"
            ),
            ConfigError::InvalidFailureRate(rate) => {
                write!(f, "APP_REORDER_FAILURE_RATE must be within [0, 1] (got {rate})")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for variable in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_DATA_DIR",
            "APP_LATENCY_MIN_MS",
            "APP_LATENCY_MAX_MS",
            "APP_REORDER_FAILURE_RATE",
            "APP_SEED",
            "APP_SEED_JOBS",
            "APP_SEED_CANDIDATES",
        ] {
            env::remove_var(variable);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_simulation_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LATENCY_MIN_MS", "0");
        env::set_var("APP_LATENCY_MAX_MS", "0");
        env::set_var("APP_REORDER_FAILURE_RATE", "0.5");
        env::set_var("APP_SEED", "42");
        env::set_var("APP_DATA_DIR", "/tmp/talentflow");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.simulation.latency_window().1, Duration::ZERO);
        assert_eq!(config.simulation.reorder_failure_rate, 0.5);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/tmp/talentflow"))
        );
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_failure_rate() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REORDER_FAILURE_RATE", "1.5");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidFailureRate(_))
        ));
        reset_env();
    }

    #[test]
    fn rejects_inverted_latency_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LATENCY_MIN_MS", "900");
        env::set_var("APP_LATENCY_MAX_MS", "100");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidLatencyWindow { .. })
        ));
        reset_env();
    }
}
