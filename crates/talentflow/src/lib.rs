pub mod client;
pub mod config;
pub mod error;
pub mod hiring;
pub mod storage;
pub mod telemetry;
