//! The sampling tick: snapshot acquisition, normalization, appends.
//!
//! One tokio interval drives ticks. Within a tick, every enabled
//! category is acquired concurrently; each acquisition runs the
//! provider call on the blocking pool bounded by a timeout. Failures
//! degrade freshness for that category only; nothing in here is fatal,
//! and the next scheduled tick is the retry.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use crate::error::{ProviderError, SampleError};
use crate::normalize::{self, Unit};
use crate::providers::{
    CpuSnapshot, DiskSnapshot, MemorySnapshot, NetworkSnapshot, SnapshotProvider,
    TemperatureSnapshot,
};
use crate::registry::{series_key, MetricCategory};
use crate::ringbuffer::MetricSample;
use crate::state::SharedState;

/// One raw reading flattened out of a category snapshot, ready for
/// normalization.
#[derive(Debug, Clone)]
pub struct RawReading {
    pub series: String,
    pub entity: Option<String>,
    pub raw: String,
    pub unit: Unit,
}

impl RawReading {
    fn overall(category: MetricCategory, metric: &str, raw: String, unit: Unit) -> Self {
        Self {
            series: series_key(category, metric, None),
            entity: None,
            raw,
            unit,
        }
    }

    fn per_entity(
        category: MetricCategory,
        metric: &str,
        entity: String,
        raw: String,
        unit: Unit,
    ) -> Self {
        Self {
            series: series_key(category, metric, Some(&entity)),
            entity: Some(entity),
            raw,
            unit,
        }
    }
}

/// Runs the sampling loop forever. The first tick fires immediately,
/// which warms the counter baselines of delta-based categories.
pub async fn run(state: SharedState) {
    let mut ticker = tokio::time::interval(state.config.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tick(&state).await;
    }
}

/// Performs one sampling cycle across all enabled categories.
#[instrument(skip(state))]
pub async fn tick(state: &SharedState) {
    let started = Instant::now();
    let timestamp = chrono::Utc::now().timestamp();

    tokio::join!(
        sample_category(state, MetricCategory::Cpu, timestamp),
        sample_category(state, MetricCategory::Memory, timestamp),
        sample_category(state, MetricCategory::Disk, timestamp),
        sample_category(state, MetricCategory::Network, timestamp),
        sample_category(state, MetricCategory::Temperature, timestamp),
    );

    state.stats.record_tick(started.elapsed(), timestamp);
    debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tick completed"
    );
}

/// Acquires and ingests one category. Never fails; errors are absorbed
/// into the stats counters and the log.
async fn sample_category(state: &SharedState, category: MetricCategory, timestamp: i64) {
    if !state.config.category_enabled(category) {
        return;
    }

    let stats = state.stats.category(category);
    stats.attempts.fetch_add(1, Ordering::Relaxed);

    match acquire(state, category).await {
        Ok(readings) => {
            let appended = ingest(state, category, timestamp, readings);
            debug!(%category, appended, "category sampled");
        }
        Err(SampleError::Timeout { category, timeout }) => {
            stats.timeouts.fetch_add(1, Ordering::Relaxed);
            stats.failures.fetch_add(1, Ordering::Relaxed);
            warn!(%category, ?timeout, "snapshot acquisition timed out, keeping previous state");
        }
        Err(SampleError::ProviderUnavailable {
            category,
            source: ProviderError::NotReady { what },
        }) => {
            // Expected on the first tick of delta-based categories.
            stats.failures.fetch_add(1, Ordering::Relaxed);
            debug!(%category, what, "provider warming up");
        }
        Err(err) => {
            stats.failures.fetch_add(1, Ordering::Relaxed);
            warn!(%category, error = %err, "snapshot failed, keeping previous state");
        }
    }
}

/// Runs the provider call for a category on the blocking pool, bounded
/// by the configured acquisition timeout.
async fn acquire(
    state: &SharedState,
    category: MetricCategory,
) -> Result<Vec<RawReading>, SampleError> {
    let provider = Arc::clone(&state.provider);
    let timeout = state.config.acquire_timeout();

    let task = tokio::task::spawn_blocking(move || snapshot_readings(provider.as_ref(), category));

    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(SampleError::Timeout { category, timeout }),
        Ok(Err(join_err)) => Err(SampleError::ProviderUnavailable {
            category,
            source: ProviderError::Task(join_err.to_string()),
        }),
        Ok(Ok(Err(provider_err))) => Err(SampleError::ProviderUnavailable {
            category,
            source: provider_err,
        }),
        Ok(Ok(Ok(readings))) => Ok(readings),
    }
}

/// Queries the provider and flattens the snapshot into raw readings.
fn snapshot_readings(
    provider: &dyn SnapshotProvider,
    category: MetricCategory,
) -> Result<Vec<RawReading>, ProviderError> {
    match category {
        MetricCategory::Cpu => provider.cpu().map(flatten_cpu),
        MetricCategory::Memory => provider.memory().map(flatten_memory),
        MetricCategory::Disk => provider.disk().map(flatten_disk),
        MetricCategory::Network => provider.network().map(flatten_network),
        MetricCategory::Temperature => provider.temperature().map(flatten_temperature),
    }
}

fn flatten_cpu(snapshot: CpuSnapshot) -> Vec<RawReading> {
    let category = MetricCategory::Cpu;
    let mut readings = vec![
        RawReading::overall(category, "load", snapshot.overall_load, Unit::Percent),
        RawReading::overall(category, "idle", snapshot.idle, Unit::Percent),
    ];
    for core in snapshot.per_core {
        readings.push(RawReading::per_entity(
            category,
            "load",
            core.core.to_string(),
            core.load,
            Unit::Percent,
        ));
    }
    readings
}

fn flatten_memory(snapshot: MemorySnapshot) -> Vec<RawReading> {
    let category = MetricCategory::Memory;
    vec![
        RawReading::overall(category, "used_percent", snapshot.used_percent, Unit::Percent),
        RawReading::overall(
            category,
            "swap_used_percent",
            snapshot.swap_used_percent,
            Unit::Percent,
        ),
    ]
}

fn flatten_disk(snapshot: DiskSnapshot) -> Vec<RawReading> {
    let category = MetricCategory::Disk;
    let mut readings = Vec::new();
    for fs in snapshot.filesystems {
        readings.push(RawReading::per_entity(
            category,
            "used_percent",
            fs.mount,
            fs.used_percent,
            Unit::Percent,
        ));
    }
    if let Some(rate) = snapshot.read_rate {
        readings.push(RawReading::overall(category, "read_kbps", rate, Unit::KbPerSec));
    }
    if let Some(rate) = snapshot.write_rate {
        readings.push(RawReading::overall(category, "write_kbps", rate, Unit::KbPerSec));
    }
    readings
}

fn flatten_network(snapshot: NetworkSnapshot) -> Vec<RawReading> {
    let category = MetricCategory::Network;
    let mut readings = Vec::new();
    for iface in snapshot.interfaces {
        readings.push(RawReading::per_entity(
            category,
            "rx_kbps",
            iface.interface.clone(),
            iface.rx_rate,
            Unit::KbPerSec,
        ));
        readings.push(RawReading::per_entity(
            category,
            "tx_kbps",
            iface.interface,
            iface.tx_rate,
            Unit::KbPerSec,
        ));
    }
    readings
}

fn flatten_temperature(snapshot: TemperatureSnapshot) -> Vec<RawReading> {
    let category = MetricCategory::Temperature;
    snapshot
        .sensors
        .into_iter()
        .map(|sensor| {
            RawReading::per_entity(
                category,
                "celsius",
                sensor.sensor,
                sensor.celsius,
                Unit::Celsius,
            )
        })
        .collect()
}

/// Normalizes and appends a batch of readings for one tick.
///
/// Each reading is handled independently: a malformed one is counted
/// and logged, its siblings still append. Returns the number of samples
/// appended.
fn ingest(
    state: &SharedState,
    category: MetricCategory,
    timestamp: i64,
    readings: Vec<RawReading>,
) -> u64 {
    let stats = state.stats.category(category);
    let mut appended = 0u64;

    for reading in readings {
        match normalize::parse(reading.unit, &reading.raw) {
            Ok(value) => {
                let sample = match reading.entity {
                    Some(entity) => MetricSample::with_entity(timestamp, value, entity),
                    None => MetricSample::new(timestamp, value),
                };
                state.registry.append(&reading.series, sample);
                appended += 1;
            }
            Err(_) => {
                stats.malformed.fetch_add(1, Ordering::Relaxed);
                let err = SampleError::MalformedReading {
                    series: reading.series,
                    raw: reading.raw,
                };
                warn!(%category, error = %err, "dropping malformed reading");
            }
        }
    }

    stats.appended.fetch_add(appended, Ordering::Relaxed);
    appended
}
