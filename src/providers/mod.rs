//! Snapshot providers: the OS-facing sensor seam.
//!
//! A provider answers one point-in-time reading per metric category, or
//! fails with a distinguishable error. Readings are handed back the way
//! the sensor layer formats them for display (`"45.00%"`, `"12.34 KB/s"`);
//! turning them into canonical numbers is the sampler's job, so a
//! provider stays a dumb snapshot source with no history of its own
//! beyond the counter baselines rate metrics need.

pub mod proc;
pub mod synthetic;

pub use proc::ProcProvider;
pub use synthetic::SyntheticProvider;

use crate::error::ProviderError;

/// Load of a single CPU core.
#[derive(Debug, Clone)]
pub struct CoreLoad {
    pub core: usize,
    pub load: String,
}

/// Point-in-time CPU utilization reading.
#[derive(Debug, Clone)]
pub struct CpuSnapshot {
    pub overall_load: String,
    pub idle: String,
    pub per_core: Vec<CoreLoad>,
}

/// Point-in-time memory utilization reading.
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    pub used_percent: String,
    pub swap_used_percent: String,
}

/// Usage of one mounted filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemReading {
    pub mount: String,
    pub used_percent: String,
}

/// Point-in-time disk reading: per-filesystem usage plus aggregate
/// throughput. Throughput is absent until the provider has a counter
/// baseline.
#[derive(Debug, Clone)]
pub struct DiskSnapshot {
    pub filesystems: Vec<FilesystemReading>,
    pub read_rate: Option<String>,
    pub write_rate: Option<String>,
}

/// Throughput of one network interface.
#[derive(Debug, Clone)]
pub struct InterfaceReading {
    pub interface: String,
    pub rx_rate: String,
    pub tx_rate: String,
}

/// Point-in-time network throughput reading.
#[derive(Debug, Clone)]
pub struct NetworkSnapshot {
    pub interfaces: Vec<InterfaceReading>,
}

/// Temperature of one sensor.
#[derive(Debug, Clone)]
pub struct SensorTemperature {
    pub sensor: String,
    pub celsius: String,
}

/// Point-in-time temperature reading across all sensors. May be empty
/// on hosts without exposed sensors.
#[derive(Debug, Clone)]
pub struct TemperatureSnapshot {
    pub sensors: Vec<SensorTemperature>,
}

/// One query per metric category, returning a structured reading or a
/// distinguishable error. Every call is best-effort; the caller owns
/// retries (the next tick) and timeouts.
pub trait SnapshotProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn cpu(&self) -> Result<CpuSnapshot, ProviderError>;
    fn memory(&self) -> Result<MemorySnapshot, ProviderError>;
    fn disk(&self) -> Result<DiskSnapshot, ProviderError>;
    fn network(&self) -> Result<NetworkSnapshot, ProviderError>;
    fn temperature(&self) -> Result<TemperatureSnapshot, ProviderError>;
}

/// Formats a `[0, 1]` ratio the way the sensor layer displays percentages.
pub(crate) fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Formats a KB/s throughput value.
pub(crate) fn format_rate(kbps: f64) -> String {
    format!("{:.2} KB/s", kbps)
}

/// Formats a temperature in degrees Celsius.
pub(crate) fn format_celsius(celsius: f64) -> String {
    format!("{:.1}°C", celsius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        assert_eq!(format_percent(0.45), "45.00%");
        assert_eq!(format_percent(1.0), "100.00%");
        assert_eq!(format_rate(12.339), "12.34 KB/s");
        assert_eq!(format_celsius(47.04), "47.0°C");
    }
}
