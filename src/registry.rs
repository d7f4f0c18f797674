//! Series registry managing the rolling buffers for all telemetry series.
//!
//! This module provides the `SeriesRegistry` which maintains a collection
//! of rolling buffers, one per metric/entity series, created lazily on the
//! first observation of a series and kept for the process lifetime.

use dashmap::DashMap;
use serde::Serialize;

use crate::ringbuffer::{MetricSample, SeriesBuffer};

/// Top-level telemetry categories sampled on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricCategory {
    Cpu,
    Memory,
    Disk,
    Network,
    Temperature,
}

impl MetricCategory {
    /// All categories, in sampling order.
    pub const ALL: [MetricCategory; 5] = [
        MetricCategory::Cpu,
        MetricCategory::Memory,
        MetricCategory::Disk,
        MetricCategory::Network,
        MetricCategory::Temperature,
    ];

    /// Stable series-key prefix for this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            MetricCategory::Cpu => "cpu",
            MetricCategory::Memory => "mem",
            MetricCategory::Disk => "disk",
            MetricCategory::Network => "net",
            MetricCategory::Temperature => "temp",
        }
    }

    /// Human-readable category name used in logs and the health report.
    pub fn name(&self) -> &'static str {
        match self {
            MetricCategory::Cpu => "cpu",
            MetricCategory::Memory => "memory",
            MetricCategory::Disk => "disk",
            MetricCategory::Network => "network",
            MetricCategory::Temperature => "temperature",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        MetricCategory::ALL
            .into_iter()
            .find(|c| c.name() == name || c.prefix() == name)
    }
}

impl std::fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds the full series key for a metric within a category.
///
/// Overall series: `cpu.load`. Per-entity series: `cpu.load:3`,
/// `net.rx_kbps:eth0`.
pub fn series_key(category: MetricCategory, metric: &str, entity: Option<&str>) -> String {
    match entity {
        Some(e) => format!("{}.{}:{}", category.prefix(), metric, e),
        None => format!("{}.{}", category.prefix(), metric),
    }
}

/// Statistics about the series registry, served by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStats {
    pub window: usize,
    pub series_count: usize,
    pub interval_seconds: f64,
    /// How far back the full window reaches at the configured cadence.
    pub history_seconds: f64,
}

/// Registry of rolling buffers, one per telemetry series.
///
/// The sampler is the single writer; HTTP handlers read concurrently.
/// Buffers are created on first append and never removed, so an entity
/// that disappears from the host (an unplugged interface, an unmounted
/// filesystem) keeps its last window of history.
pub struct SeriesRegistry {
    buffers: DashMap<String, SeriesBuffer>,
    window: usize,
    interval_seconds: f64,
}

impl SeriesRegistry {
    /// Creates a registry whose series all share the same window size.
    ///
    /// `interval_seconds` is only used for reporting how much wall-clock
    /// history the window covers.
    pub fn new(window: usize, interval_seconds: f64) -> Self {
        Self {
            buffers: DashMap::new(),
            window,
            interval_seconds,
        }
    }

    /// Appends a sample to the named series, creating the buffer if this
    /// is the first observation of the series.
    ///
    /// Eviction of the oldest sample happens under the same map-entry
    /// guard as the append, so readers never observe a partial state.
    pub fn append(&self, key: &str, sample: MetricSample) {
        self.buffers
            .entry(key.to_string())
            .or_insert_with(|| SeriesBuffer::new(self.window))
            .push(sample);
    }

    /// Returns the most recent sample of a series, or None when the series
    /// is unknown or has no data yet.
    pub fn current_value(&self, key: &str) -> Option<MetricSample> {
        self.buffers.get(key).and_then(|buf| buf.last().cloned())
    }

    /// Returns the series history in chronological order (oldest first).
    ///
    /// The result is an owned snapshot; concurrent appends do not affect
    /// it. An unknown series yields an empty history, not an error.
    pub fn history(&self, key: &str) -> Vec<MetricSample> {
        self.buffers
            .get(key)
            .map(|buf| buf.history())
            .unwrap_or_default()
    }

    /// Unix timestamp of the newest sample in a series, if any.
    ///
    /// Lets consumers detect a stalled series (entity gone from the host)
    /// without the registry ever deleting it.
    pub fn last_updated_unix(&self, key: &str) -> Option<i64> {
        self.buffers.get(key).and_then(|buf| buf.last().map(|s| s.timestamp))
    }

    /// Returns the sorted keys of every series known in a category.
    pub fn known_series(&self, category: MetricCategory) -> Vec<String> {
        let prefix = format!("{}.", category.prefix());
        let mut keys: Vec<String> = self
            .buffers
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    /// Returns the sorted keys of every series in the registry.
    pub fn all_series(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.buffers.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of samples currently held for a series (0 when unknown).
    pub fn series_len(&self, key: &str) -> usize {
        self.buffers.get(key).map(|buf| buf.len()).unwrap_or(0)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Returns statistics about the registry for the health endpoint.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            window: self.window,
            series_count: self.buffers.len(),
            interval_seconds: self.interval_seconds,
            history_seconds: self.window as f64 * self.interval_seconds,
        }
    }
}
