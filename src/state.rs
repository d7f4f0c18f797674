//! Application state shared between the sampling task and HTTP handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::providers::SnapshotProvider;
use crate::registry::SeriesRegistry;
use crate::stats::SamplerStats;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Process-wide state, created once at startup.
///
/// The sampling task is the only writer of the registry; handlers read
/// it concurrently.
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<SeriesRegistry>,
    pub provider: Arc<dyn SnapshotProvider>,
    pub stats: Arc<SamplerStats>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn SnapshotProvider>) -> SharedState {
        let registry = Arc::new(SeriesRegistry::new(
            config.window(),
            config.interval().as_secs_f64(),
        ));

        Arc::new(Self {
            config: Arc::new(config),
            registry,
            provider,
            stats: Arc::new(SamplerStats::new()),
            start_time: Instant::now(),
        })
    }
}
