//! HTTP endpoint handlers for the dashboard API.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: service info and endpoint listing
//! - `/cpu`, `/memory`, `/disk`, `/network`, `/temperature`: category projections
//! - `/series`: a single series by key
//! - `/keys`: known series keys
//! - `/health`: sampler health report
//! - `/config`: effective configuration
//! - `/system`: static host information

pub mod config;
pub mod health;
pub mod root;
pub mod system;
pub mod telemetry;

// Re-export handlers
pub use config::config_handler;
pub use health::health_handler;
pub use root::root_handler;
pub use system::system_handler;
pub use telemetry::{
    cpu_handler, disk_handler, keys_handler, memory_handler, network_handler, series_handler,
    temperature_handler,
};
