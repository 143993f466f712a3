//! Prometheus exporter for Enphase Envoy solar gateways
//!
//! Every scrape fetches the production report of one Envoy over HTTPS and
//! translates its production and consumption sections into metrics.

pub mod api;
pub mod collector;
pub mod config;
pub mod credential;
pub mod envoy;
pub mod models;

// Re-export common types for easier access
pub use api::ApiManager;
pub use collector::{Observation, TelemetryCollector};
pub use config::{Cli, Config};
pub use credential::Credential;
pub use envoy::{DeviceClient, DeviceError, DeviceHandle, EnvoyClient};
pub use models::{ProductionReport, Section};

pub fn get_unix_ts() -> u64 {
    return std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
}
