//! Integration tests for the sampling tick.
//!
//! A scripted provider stands in for the OS sensor layer, replaying one
//! pre-programmed response per call. The tests drive `sampler::tick`
//! directly and inspect registry and stats state afterwards.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use hostpulse::config::Config;
use hostpulse::error::ProviderError;
use hostpulse::providers::{
    CoreLoad, CpuSnapshot, DiskSnapshot, InterfaceReading, MemorySnapshot, NetworkSnapshot,
    SensorTemperature, SnapshotProvider, TemperatureSnapshot,
};
use hostpulse::registry::MetricCategory;
use hostpulse::state::AppState;
use hostpulse::{sampler, SharedState};

/// Provider replaying scripted responses, one per call.
///
/// Categories without a script (or with an exhausted one) answer
/// `Unsupported`, so they never append anything.
#[derive(Default)]
struct ScriptedProvider {
    cpu: Mutex<VecDeque<Result<CpuSnapshot, ProviderError>>>,
    memory: Mutex<VecDeque<Result<MemorySnapshot, ProviderError>>>,
    network: Mutex<VecDeque<Result<NetworkSnapshot, ProviderError>>>,
    temperature: Mutex<VecDeque<Result<TemperatureSnapshot, ProviderError>>>,
}

fn pop<T>(queue: &Mutex<VecDeque<Result<T, ProviderError>>>) -> Result<T, ProviderError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or(Err(ProviderError::Unsupported { what: "scripted" }))
}

impl SnapshotProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn cpu(&self) -> Result<CpuSnapshot, ProviderError> {
        pop(&self.cpu)
    }

    fn memory(&self) -> Result<MemorySnapshot, ProviderError> {
        pop(&self.memory)
    }

    fn disk(&self) -> Result<DiskSnapshot, ProviderError> {
        Err(ProviderError::Unsupported { what: "scripted" })
    }

    fn network(&self) -> Result<NetworkSnapshot, ProviderError> {
        pop(&self.network)
    }

    fn temperature(&self) -> Result<TemperatureSnapshot, ProviderError> {
        pop(&self.temperature)
    }
}

fn cpu_snapshot(overall: &str, cores: &[(usize, &str)]) -> CpuSnapshot {
    CpuSnapshot {
        overall_load: overall.to_string(),
        idle: "0.00%".to_string(),
        per_core: cores
            .iter()
            .map(|(core, load)| CoreLoad {
                core: *core,
                load: load.to_string(),
            })
            .collect(),
    }
}

fn test_state(provider: ScriptedProvider) -> SharedState {
    let config = Config {
        enable_disk: Some(false),
        ..Config::default()
    };
    AppState::new(config, Arc::new(provider))
}

#[tokio::test]
async fn test_tick_appends_normalized_samples() {
    let provider = ScriptedProvider::default();
    provider.cpu.lock().unwrap().push_back(Ok(cpu_snapshot(
        "45.00%",
        &[(0, "30.00%"), (1, "60.00%")],
    )));
    provider
        .memory
        .lock()
        .unwrap()
        .push_back(Ok(MemorySnapshot {
            used_percent: "71.50%".to_string(),
            swap_used_percent: "2.25%".to_string(),
        }));

    let state = test_state(provider);
    sampler::tick(&state).await;

    assert_eq!(state.registry.current_value("cpu.load").unwrap().value, 45.0);
    assert_eq!(state.registry.current_value("cpu.load:0").unwrap().value, 30.0);
    assert_eq!(state.registry.current_value("cpu.load:1").unwrap().value, 60.0);
    assert_eq!(
        state
            .registry
            .current_value("mem.used_percent")
            .unwrap()
            .value,
        71.5
    );
    assert_eq!(state.registry.series_len("cpu.load"), 1);

    // All samples of a tick share its timestamp.
    let overall = state.registry.current_value("cpu.load").unwrap();
    let core = state.registry.current_value("cpu.load:1").unwrap();
    assert_eq!(overall.timestamp, core.timestamp);
    assert_eq!(core.entity.as_deref(), Some("1"));
}

#[tokio::test]
async fn test_provider_failure_preserves_previous_state() {
    let provider = ScriptedProvider::default();
    {
        let mut cpu = provider.cpu.lock().unwrap();
        cpu.push_back(Ok(cpu_snapshot("45.00%", &[])));
        cpu.push_back(Err(ProviderError::Read {
            path: "/proc/stat".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }));
    }

    let state = test_state(provider);
    sampler::tick(&state).await;
    sampler::tick(&state).await;

    // The failed tick is a no-op for the category: the buffer neither
    // grew nor changed.
    assert_eq!(state.registry.series_len("cpu.load"), 1);
    assert_eq!(state.registry.current_value("cpu.load").unwrap().value, 45.0);

    let cpu_stats = state.stats.category(MetricCategory::Cpu);
    assert_eq!(cpu_stats.attempts.load(Ordering::Relaxed), 2);
    assert_eq!(cpu_stats.failures.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_malformed_overall_reading_is_skipped() {
    let provider = ScriptedProvider::default();
    {
        let mut memory = provider.memory.lock().unwrap();
        memory.push_back(Ok(MemorySnapshot {
            used_percent: "40.00%".to_string(),
            swap_used_percent: "1.00%".to_string(),
        }));
        memory.push_back(Ok(MemorySnapshot {
            used_percent: "N/A".to_string(),
            swap_used_percent: "1.50%".to_string(),
        }));
    }

    let state = test_state(provider);
    sampler::tick(&state).await;
    sampler::tick(&state).await;

    // The malformed reading appended nothing; the previous value stands.
    assert_eq!(state.registry.series_len("mem.used_percent"), 1);
    assert_eq!(
        state
            .registry
            .current_value("mem.used_percent")
            .unwrap()
            .value,
        40.0
    );

    // Its healthy sibling in the same snapshot still appended.
    assert_eq!(state.registry.series_len("mem.swap_used_percent"), 2);

    let memory_stats = state.stats.category(MetricCategory::Memory);
    assert_eq!(memory_stats.malformed.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_overall_load_na_keeps_previous_current_value() {
    let provider = ScriptedProvider::default();
    {
        let mut cpu = provider.cpu.lock().unwrap();
        cpu.push_back(Ok(cpu_snapshot("45.00%", &[])));
        cpu.push_back(Ok(cpu_snapshot("N/A", &[])));
    }

    let state = test_state(provider);
    sampler::tick(&state).await;
    sampler::tick(&state).await;

    assert_eq!(state.registry.series_len("cpu.load"), 1);
    assert_eq!(state.registry.current_value("cpu.load").unwrap().value, 45.0);
    assert_eq!(
        state
            .stats
            .category(MetricCategory::Cpu)
            .malformed
            .load(Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn test_per_entity_isolation_within_a_snapshot() {
    let provider = ScriptedProvider::default();
    provider.cpu.lock().unwrap().push_back(Ok(cpu_snapshot(
        "50.00%",
        &[(0, "30.00%"), (1, "garbage")],
    )));

    let state = test_state(provider);
    sampler::tick(&state).await;

    // Core 1's bad reading did not block core 0 or the overall series.
    assert_eq!(state.registry.current_value("cpu.load").unwrap().value, 50.0);
    assert_eq!(state.registry.current_value("cpu.load:0").unwrap().value, 30.0);
    assert!(state.registry.current_value("cpu.load:1").is_none());
    assert_eq!(
        state
            .stats
            .category(MetricCategory::Cpu)
            .malformed
            .load(Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn test_entity_set_growth_across_ticks() {
    let provider = ScriptedProvider::default();
    {
        let mut cpu = provider.cpu.lock().unwrap();
        cpu.push_back(Ok(cpu_snapshot("10.00%", &[(0, "10.00%"), (1, "10.00%")])));
        cpu.push_back(Ok(cpu_snapshot(
            "20.00%",
            &[(0, "20.00%"), (1, "20.00%"), (2, "20.00%")],
        )));
    }

    let state = test_state(provider);
    sampler::tick(&state).await;
    sampler::tick(&state).await;

    assert_eq!(state.registry.series_len("cpu.load:0"), 2);
    assert_eq!(state.registry.series_len("cpu.load:1"), 2);
    assert_eq!(state.registry.series_len("cpu.load:2"), 1);
}

#[tokio::test]
async fn test_shrinking_entity_set_stalls_series() {
    let provider = ScriptedProvider::default();
    {
        let mut network = provider.network.lock().unwrap();
        network.push_back(Ok(NetworkSnapshot {
            interfaces: vec![
                InterfaceReading {
                    interface: "eth0".to_string(),
                    rx_rate: "100.00 KB/s".to_string(),
                    tx_rate: "50.00 KB/s".to_string(),
                },
                InterfaceReading {
                    interface: "wlan0".to_string(),
                    rx_rate: "10.00 KB/s".to_string(),
                    tx_rate: "5.00 KB/s".to_string(),
                },
            ],
        }));
        // wlan0 disappears on the second tick.
        network.push_back(Ok(NetworkSnapshot {
            interfaces: vec![InterfaceReading {
                interface: "eth0".to_string(),
                rx_rate: "120.00 KB/s".to_string(),
                tx_rate: "60.00 KB/s".to_string(),
            }],
        }));
    }

    let state = test_state(provider);
    sampler::tick(&state).await;
    sampler::tick(&state).await;

    assert_eq!(state.registry.series_len("net.rx_kbps:eth0"), 2);
    // The stalled series keeps its last window, it is not deleted.
    assert_eq!(state.registry.series_len("net.rx_kbps:wlan0"), 1);
    assert_eq!(
        state
            .registry
            .current_value("net.rx_kbps:wlan0")
            .unwrap()
            .value,
        10.0
    );
}

#[tokio::test]
async fn test_temperature_readings_append_per_sensor() {
    let provider = ScriptedProvider::default();
    provider
        .temperature
        .lock()
        .unwrap()
        .push_back(Ok(TemperatureSnapshot {
            sensors: vec![SensorTemperature {
                sensor: "thermal_zone0".to_string(),
                celsius: "47.0°C".to_string(),
            }],
        }));

    let state = test_state(provider);
    sampler::tick(&state).await;

    assert_eq!(
        state
            .registry
            .current_value("temp.celsius:thermal_zone0")
            .unwrap()
            .value,
        47.0
    );
}

/// Provider whose CPU query hangs longer than the acquisition timeout.
struct HangingProvider;

impl SnapshotProvider for HangingProvider {
    fn name(&self) -> &'static str {
        "hanging"
    }

    fn cpu(&self) -> Result<CpuSnapshot, ProviderError> {
        std::thread::sleep(std::time::Duration::from_millis(500));
        Ok(cpu_snapshot("45.00%", &[]))
    }

    fn memory(&self) -> Result<MemorySnapshot, ProviderError> {
        Err(ProviderError::Unsupported { what: "memory" })
    }

    fn disk(&self) -> Result<DiskSnapshot, ProviderError> {
        Err(ProviderError::Unsupported { what: "disk" })
    }

    fn network(&self) -> Result<NetworkSnapshot, ProviderError> {
        Err(ProviderError::Unsupported { what: "network" })
    }

    fn temperature(&self) -> Result<TemperatureSnapshot, ProviderError> {
        Err(ProviderError::Unsupported { what: "temperature" })
    }
}

#[tokio::test]
async fn test_hung_acquisition_is_bounded_by_timeout() {
    let config = Config {
        interval_ms: Some(200),
        acquire_timeout_ms: Some(50),
        enable_memory: Some(false),
        enable_disk: Some(false),
        enable_network: Some(false),
        enable_temperature: Some(false),
        ..Config::default()
    };
    let state = AppState::new(config, Arc::new(HangingProvider));

    let started = std::time::Instant::now();
    sampler::tick(&state).await;

    // The tick came back near the timeout, not the provider's sleep.
    assert!(started.elapsed() < std::time::Duration::from_millis(400));
    assert!(state.registry.current_value("cpu.load").is_none());

    let cpu_stats = state.stats.category(MetricCategory::Cpu);
    assert_eq!(cpu_stats.timeouts.load(Ordering::Relaxed), 1);
    assert_eq!(cpu_stats.failures.load(Ordering::Relaxed), 1);
}
