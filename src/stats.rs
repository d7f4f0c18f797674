//! Sampler health statistics.
//!
//! This is the observability sink for everything the sampler absorbs:
//! provider failures, acquisition timeouts, malformed readings. Counters
//! are plain atomics updated from the sampling task and snapshotted into
//! a serializable report by the health endpoint.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::registry::MetricCategory;

/// Running statistics for a single duration metric.
#[derive(Clone, Copy, Default)]
struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
    }

    fn report(&self) -> DurationReport {
        DurationReport {
            last: self.last,
            avg: if self.count == 0 {
                0.0
            } else {
                self.sum / self.count as f64
            },
            min: self.min,
            max: self.max,
            count: self.count,
        }
    }
}

/// Snapshot of a duration running stat, in seconds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DurationReport {
    pub last: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub count: u64,
}

/// Counters for one metric category.
#[derive(Default)]
pub struct CategoryStats {
    /// Acquisition rounds started.
    pub attempts: AtomicU64,
    /// Provider-level failures (category produced no data this tick).
    pub failures: AtomicU64,
    /// Acquisitions aborted by the timeout, also counted as failures.
    pub timeouts: AtomicU64,
    /// Per-entity readings dropped by normalization.
    pub malformed: AtomicU64,
    /// Samples appended to the registry.
    pub appended: AtomicU64,
}

impl CategoryStats {
    fn report(&self) -> CategoryReport {
        CategoryReport {
            attempts: self.attempts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            appended: self.appended.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of one category's counters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryReport {
    pub attempts: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub malformed: u64,
    pub appended: u64,
}

/// Health statistics for the sampling loop.
pub struct SamplerStats {
    started: Instant,
    pub ticks_total: AtomicU64,
    /// Unix timestamp of the last completed tick, 0 before the first.
    last_tick_unix: AtomicI64,
    tick_duration: Mutex<RunningStat>,
    cpu: CategoryStats,
    memory: CategoryStats,
    disk: CategoryStats,
    network: CategoryStats,
    temperature: CategoryStats,
}

impl SamplerStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            ticks_total: AtomicU64::new(0),
            last_tick_unix: AtomicI64::new(0),
            tick_duration: Mutex::new(RunningStat::default()),
            cpu: CategoryStats::default(),
            memory: CategoryStats::default(),
            disk: CategoryStats::default(),
            network: CategoryStats::default(),
            temperature: CategoryStats::default(),
        }
    }

    pub fn category(&self, category: MetricCategory) -> &CategoryStats {
        match category {
            MetricCategory::Cpu => &self.cpu,
            MetricCategory::Memory => &self.memory,
            MetricCategory::Disk => &self.disk,
            MetricCategory::Network => &self.network,
            MetricCategory::Temperature => &self.temperature,
        }
    }

    /// Records a completed tick and its wall-clock duration.
    pub fn record_tick(&self, duration: Duration, at_unix: i64) {
        self.ticks_total.fetch_add(1, Ordering::Relaxed);
        self.last_tick_unix.store(at_unix, Ordering::Relaxed);
        if let Ok(mut stat) = self.tick_duration.lock() {
            stat.add(duration.as_secs_f64());
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn last_tick_unix(&self) -> Option<i64> {
        match self.last_tick_unix.load(Ordering::Relaxed) {
            0 => None,
            ts => Some(ts),
        }
    }

    /// Snapshots every counter into a serializable report.
    pub fn report(&self, now_unix: i64) -> HealthReport {
        let last_tick = self.last_tick_unix();
        let tick_duration = self
            .tick_duration
            .lock()
            .map(|stat| stat.report())
            .unwrap_or_else(|_| RunningStat::default().report());

        let mut categories = BTreeMap::new();
        for category in MetricCategory::ALL {
            categories.insert(category.name(), self.category(category).report());
        }

        HealthReport {
            uptime_seconds: self.uptime_seconds(),
            ticks_total: self.ticks_total.load(Ordering::Relaxed),
            last_tick_unix: last_tick,
            last_tick_age_seconds: last_tick.map(|ts| (now_unix - ts).max(0)),
            tick_duration_seconds: tick_duration,
            categories,
        }
    }
}

impl Default for SamplerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable sampler health report, served by /health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub uptime_seconds: u64,
    pub ticks_total: u64,
    pub last_tick_unix: Option<i64>,
    pub last_tick_age_seconds: Option<i64>,
    pub tick_duration_seconds: DurationReport,
    pub categories: BTreeMap<&'static str, CategoryReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_stats_report() {
        let stats = SamplerStats::new();
        let report = stats.report(1000);

        assert_eq!(report.ticks_total, 0);
        assert!(report.last_tick_unix.is_none());
        assert!(report.last_tick_age_seconds.is_none());
        assert_eq!(report.categories.len(), MetricCategory::ALL.len());
        assert_eq!(report.categories["cpu"].attempts, 0);
    }

    #[test]
    fn test_record_tick() {
        let stats = SamplerStats::new();
        stats.record_tick(Duration::from_millis(20), 1000);
        stats.record_tick(Duration::from_millis(40), 1001);

        let report = stats.report(1003);
        assert_eq!(report.ticks_total, 2);
        assert_eq!(report.last_tick_unix, Some(1001));
        assert_eq!(report.last_tick_age_seconds, Some(2));
        assert_eq!(report.tick_duration_seconds.count, 2);
        assert!((report.tick_duration_seconds.avg - 0.03).abs() < 1e-9);
        assert!((report.tick_duration_seconds.max - 0.04).abs() < 1e-9);
    }

    #[test]
    fn test_category_counters() {
        let stats = SamplerStats::new();
        stats
            .category(MetricCategory::Network)
            .failures
            .fetch_add(3, Ordering::Relaxed);

        let report = stats.report(0);
        assert_eq!(report.categories["network"].failures, 3);
        assert_eq!(report.categories["cpu"].failures, 0);
    }
}
