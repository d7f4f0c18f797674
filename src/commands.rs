//! Subcommand implementations.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::normalize::{self, Unit};
use crate::providers::{ProcProvider, SnapshotProvider, SyntheticProvider};
use crate::registry::MetricCategory;

/// Runs the `check` subcommand: probe every enabled category once and
/// print the readings.
///
/// Delta-based categories need a baseline, so each category is queried
/// twice with a short pause in between; the second reading is printed.
pub fn command_check(raw: bool, config: &Config) -> Result<()> {
    let provider: Arc<dyn SnapshotProvider> = if config.synthetic() {
        Arc::new(SyntheticProvider::new())
    } else {
        Arc::new(ProcProvider::new())
    };

    println!("hostpulse check ({} provider)", provider.name());
    println!("==============================");

    for category in MetricCategory::ALL {
        if !config.category_enabled(category) {
            println!("\n[{}] disabled", category);
            continue;
        }

        // First pass establishes counter baselines.
        let _ = probe(provider.as_ref(), category);
        std::thread::sleep(std::time::Duration::from_millis(500));

        println!("\n[{}]", category);
        match probe(provider.as_ref(), category) {
            Ok(readings) => {
                if readings.is_empty() {
                    println!("  (no readings)");
                }
                for (series, value, unit) in readings {
                    if raw {
                        println!("  {:30} {}", series, value);
                    } else {
                        match normalize::parse(unit, &value) {
                            Ok(normalized) => println!("  {:30} {:.2}", series, normalized),
                            Err(e) => println!("  {:30} unparseable: {}", series, e),
                        }
                    }
                }
            }
            Err(e) => println!("  failed: {:#}", e),
        }
    }

    Ok(())
}

type Probed = Vec<(String, String, Unit)>;

fn probe(provider: &dyn SnapshotProvider, category: MetricCategory) -> Result<Probed> {
    let mut out = Vec::new();
    match category {
        MetricCategory::Cpu => {
            let snap = provider.cpu().context("cpu snapshot failed")?;
            out.push(("overall load".to_string(), snap.overall_load, Unit::Percent));
            out.push(("idle".to_string(), snap.idle, Unit::Percent));
            for core in snap.per_core {
                out.push((format!("core {}", core.core), core.load, Unit::Percent));
            }
        }
        MetricCategory::Memory => {
            let snap = provider.memory().context("memory snapshot failed")?;
            out.push(("used".to_string(), snap.used_percent, Unit::Percent));
            out.push(("swap used".to_string(), snap.swap_used_percent, Unit::Percent));
        }
        MetricCategory::Disk => {
            let snap = provider.disk().context("disk snapshot failed")?;
            for fs in snap.filesystems {
                out.push((format!("used {}", fs.mount), fs.used_percent, Unit::Percent));
            }
            if let Some(rate) = snap.read_rate {
                out.push(("read rate".to_string(), rate, Unit::KbPerSec));
            }
            if let Some(rate) = snap.write_rate {
                out.push(("write rate".to_string(), rate, Unit::KbPerSec));
            }
        }
        MetricCategory::Network => {
            let snap = provider.network().context("network snapshot failed")?;
            for iface in snap.interfaces {
                out.push((format!("{} rx", iface.interface), iface.rx_rate, Unit::KbPerSec));
                out.push((format!("{} tx", iface.interface), iface.tx_rate, Unit::KbPerSec));
            }
        }
        MetricCategory::Temperature => {
            let snap = provider.temperature().context("temperature snapshot failed")?;
            for sensor in snap.sensors {
                out.push((sensor.sensor, sensor.celsius, Unit::Celsius));
            }
        }
    }
    Ok(out)
}
