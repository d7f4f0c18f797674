//! Linux snapshot provider reading /proc and /sys.

use crate::collectors::cpu::CpuLoadTracker;
use crate::collectors::diskstats::DiskRateTracker;
use crate::collectors::netdev::NetRateTracker;
use crate::collectors::{filesystem, memory, thermal};
use crate::error::ProviderError;

use super::{
    format_celsius, format_percent, format_rate, CoreLoad, CpuSnapshot, DiskSnapshot,
    FilesystemReading, InterfaceReading, MemorySnapshot, NetworkSnapshot, SensorTemperature,
    SnapshotProvider, TemperatureSnapshot,
};

/// Snapshot provider backed by the /proc and /sys filesystems.
///
/// Rate and load categories keep a counter baseline between calls;
/// their first query after startup answers `NotReady` and the next one
/// delivers real deltas.
pub struct ProcProvider {
    cpu_tracker: CpuLoadTracker,
    net_tracker: NetRateTracker,
    disk_tracker: DiskRateTracker,
}

impl ProcProvider {
    pub fn new() -> Self {
        Self {
            cpu_tracker: CpuLoadTracker::new(),
            net_tracker: NetRateTracker::new(),
            disk_tracker: DiskRateTracker::new(),
        }
    }
}

impl Default for ProcProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for ProcProvider {
    fn name(&self) -> &'static str {
        "proc"
    }

    fn cpu(&self) -> Result<CpuSnapshot, ProviderError> {
        let load = self.cpu_tracker.load()?;

        Ok(CpuSnapshot {
            overall_load: format_percent(load.overall),
            idle: format_percent(load.idle),
            per_core: load
                .per_core
                .into_iter()
                .map(|(core, ratio)| CoreLoad {
                    core,
                    load: format_percent(ratio),
                })
                .collect(),
        })
    }

    fn memory(&self) -> Result<MemorySnapshot, ProviderError> {
        let info = memory::read_meminfo()?;

        Ok(MemorySnapshot {
            used_percent: format_percent(info.used_ratio()),
            swap_used_percent: format_percent(info.swap_used_ratio()),
        })
    }

    fn disk(&self) -> Result<DiskSnapshot, ProviderError> {
        let usages = filesystem::read_filesystem_usage()?;
        let rates = self.disk_tracker.rates()?;

        Ok(DiskSnapshot {
            filesystems: usages
                .into_iter()
                .map(|fs| FilesystemReading {
                    used_percent: format_percent(fs.used_ratio()),
                    mount: fs.mount_point,
                })
                .collect(),
            read_rate: rates.map(|r| format_rate(r.read_kbps)),
            write_rate: rates.map(|r| format_rate(r.write_kbps)),
        })
    }

    fn network(&self) -> Result<NetworkSnapshot, ProviderError> {
        let rates = self.net_tracker.rates()?;

        Ok(NetworkSnapshot {
            interfaces: rates
                .into_iter()
                .map(|rate| InterfaceReading {
                    interface: rate.name,
                    rx_rate: format_rate(rate.rx_kbps),
                    tx_rate: format_rate(rate.tx_kbps),
                })
                .collect(),
        })
    }

    fn temperature(&self) -> Result<TemperatureSnapshot, ProviderError> {
        let readings = thermal::read_temperatures();

        Ok(TemperatureSnapshot {
            sensors: readings
                .into_iter()
                .map(|reading| SensorTemperature {
                    sensor: reading.sensor,
                    celsius: format_celsius(reading.celsius),
                })
                .collect(),
        })
    }
}
