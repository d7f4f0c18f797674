//! Synthetic snapshot provider for demos and non-Linux development.
//!
//! Generates plausible telemetry with a bounded random walk per series,
//! so charts move smoothly instead of jumping white-noise style.

use std::sync::Mutex;

use rand::Rng;

use crate::collectors::host;
use crate::error::ProviderError;

use super::{
    format_celsius, format_percent, format_rate, CoreLoad, CpuSnapshot, DiskSnapshot,
    FilesystemReading, InterfaceReading, MemorySnapshot, NetworkSnapshot, SensorTemperature,
    SnapshotProvider, TemperatureSnapshot,
};

const INTERFACES: &[&str] = &["eth0", "wlan0"];
const MOUNTS: &[&str] = &["/", "/data"];

/// Walk state for every synthetic series.
struct WalkState {
    overall_load: f64,
    per_core: Vec<f64>,
    mem_used: f64,
    swap_used: f64,
    rx_kbps: Vec<f64>,
    tx_kbps: Vec<f64>,
    disk_used: Vec<f64>,
    read_kbps: f64,
    write_kbps: f64,
    cpu_temp: f64,
}

impl WalkState {
    fn new(cores: usize) -> Self {
        Self {
            overall_load: 25.0,
            per_core: vec![25.0; cores],
            mem_used: 40.0,
            swap_used: 5.0,
            rx_kbps: vec![200.0; INTERFACES.len()],
            tx_kbps: vec![80.0; INTERFACES.len()],
            disk_used: vec![55.0, 30.0],
            read_kbps: 150.0,
            write_kbps: 90.0,
            cpu_temp: 45.0,
        }
    }
}

fn step(rng: &mut impl Rng, value: &mut f64, spread: f64, min: f64, max: f64) -> f64 {
    *value = (*value + rng.gen_range(-spread..=spread)).clamp(min, max);
    *value
}

/// Provider producing randomized but continuous telemetry.
pub struct SyntheticProvider {
    cores: usize,
    state: Mutex<WalkState>,
}

impl SyntheticProvider {
    pub fn new() -> Self {
        let cores = host::core_count();
        Self {
            cores,
            state: Mutex::new(WalkState::new(cores)),
        }
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for SyntheticProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn cpu(&self) -> Result<CpuSnapshot, ProviderError> {
        let mut rng = rand::thread_rng();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let overall = step(&mut rng, &mut state.overall_load, 5.0, 0.0, 100.0);
        let per_core = (0..self.cores)
            .map(|core| {
                let load = step(&mut rng, &mut state.per_core[core], 8.0, 0.0, 100.0);
                CoreLoad {
                    core,
                    load: format_percent(load / 100.0),
                }
            })
            .collect();

        Ok(CpuSnapshot {
            overall_load: format_percent(overall / 100.0),
            idle: format_percent((100.0 - overall) / 100.0),
            per_core,
        })
    }

    fn memory(&self) -> Result<MemorySnapshot, ProviderError> {
        let mut rng = rand::thread_rng();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let used = step(&mut rng, &mut state.mem_used, 2.0, 10.0, 95.0);
        let swap = step(&mut rng, &mut state.swap_used, 0.5, 0.0, 40.0);

        Ok(MemorySnapshot {
            used_percent: format_percent(used / 100.0),
            swap_used_percent: format_percent(swap / 100.0),
        })
    }

    fn disk(&self) -> Result<DiskSnapshot, ProviderError> {
        let mut rng = rand::thread_rng();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let filesystems = MOUNTS
            .iter()
            .enumerate()
            .map(|(i, mount)| {
                let used = step(&mut rng, &mut state.disk_used[i], 0.3, 5.0, 98.0);
                FilesystemReading {
                    mount: mount.to_string(),
                    used_percent: format_percent(used / 100.0),
                }
            })
            .collect();

        let read = step(&mut rng, &mut state.read_kbps, 40.0, 0.0, 5000.0);
        let write = step(&mut rng, &mut state.write_kbps, 30.0, 0.0, 5000.0);

        Ok(DiskSnapshot {
            filesystems,
            read_rate: Some(format_rate(read)),
            write_rate: Some(format_rate(write)),
        })
    }

    fn network(&self) -> Result<NetworkSnapshot, ProviderError> {
        let mut rng = rand::thread_rng();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let interfaces = INTERFACES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let rx = step(&mut rng, &mut state.rx_kbps[i], 50.0, 0.0, 12000.0);
                let tx = step(&mut rng, &mut state.tx_kbps[i], 25.0, 0.0, 12000.0);
                InterfaceReading {
                    interface: name.to_string(),
                    rx_rate: format_rate(rx),
                    tx_rate: format_rate(tx),
                }
            })
            .collect();

        Ok(NetworkSnapshot { interfaces })
    }

    fn temperature(&self) -> Result<TemperatureSnapshot, ProviderError> {
        let mut rng = rand::thread_rng();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let celsius = step(&mut rng, &mut state.cpu_temp, 1.5, 30.0, 95.0);

        Ok(TemperatureSnapshot {
            sensors: vec![SensorTemperature {
                sensor: "cpu".to_string(),
                celsius: format_celsius(celsius),
            }],
        })
    }
}
