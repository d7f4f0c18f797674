//! hostpulse - host telemetry with rolling in-memory history.
//!
//! The crate samples host telemetry (CPU load, memory, disk, network,
//! temperature) from a snapshot provider on a fixed interval, normalizes
//! the readings into canonical numeric samples, and maintains one bounded
//! rolling window per metric/entity series. Current values and history
//! are exposed through a read API that the bundled axum transport serves
//! as JSON for live dashboards.
//!
//! # Architecture
//!
//! - [`providers`]: the OS-facing snapshot seam. One query per metric
//!   category, answering display-formatted readings or a distinguishable
//!   error. Ships a `/proc`-backed provider and a synthetic one.
//! - [`sampler`]: the tick. Acquires every enabled category concurrently
//!   (bounded by a timeout), normalizes readings with per-entity
//!   isolation, and appends exactly one sample per healthy series.
//! - [`registry`]: rolling buffers per series, created lazily and never
//!   removed. Single writer (the sampler), concurrent readers.
//! - [`handlers`]: the JSON read API.
//!
//! Sampling failures degrade freshness, never state: a failing category
//! keeps its previous window untouched and the next tick is the retry.
//!
//! # Example
//!
//! ```rust
//! use hostpulse::registry::SeriesRegistry;
//! use hostpulse::ringbuffer::MetricSample;
//!
//! let registry = SeriesRegistry::new(60, 1.0);
//! registry.append("cpu.load", MetricSample::new(1700000000, 45.0));
//!
//! assert_eq!(registry.current_value("cpu.load").unwrap().value, 45.0);
//! assert!(registry.history("cpu.load:99").is_empty());
//! ```

pub mod cli;
pub mod collectors;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod normalize;
pub mod providers;
pub mod registry;
pub mod ringbuffer;
pub mod sampler;
pub mod startup_checks;
pub mod state;
pub mod stats;

// Re-export main types for convenience
pub use config::Config;
pub use error::{ProviderError, SampleError};
pub use providers::SnapshotProvider;
pub use registry::{MetricCategory, SeriesRegistry};
pub use ringbuffer::{MetricSample, SeriesBuffer};
pub use state::{AppState, SharedState};
