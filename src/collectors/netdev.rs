//! Network interface throughput collector based on /proc/net/dev deltas.

use std::fs;
use std::sync::Mutex;
use std::time::Instant;

use ahash::AHashMap as HashMap;

use crate::error::ProviderError;

const PROC_NET_DEV: &str = "/proc/net/dev";

/// Cumulative byte counters for one network interface.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Throughput of one interface between two readings, in KB/s.
#[derive(Debug, Clone)]
pub struct InterfaceRate {
    pub name: String,
    pub rx_kbps: f64,
    pub tx_kbps: f64,
}

/// Parses /proc/net/dev content into per-interface byte counters.
pub fn parse_netdev(content: &str) -> HashMap<String, InterfaceCounters> {
    let mut counters = HashMap::new();

    // First two lines are headers.
    for line in content.lines().skip(2) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let values: Vec<&str> = rest.split_whitespace().collect();
        if values.len() < 16 {
            continue;
        }

        counters.insert(
            name.trim().to_string(),
            InterfaceCounters {
                rx_bytes: values[0].parse().unwrap_or(0),
                tx_bytes: values[8].parse().unwrap_or(0),
            },
        );
    }

    counters
}

/// Reads current interface byte counters from /proc/net/dev.
pub fn read_netdev() -> Result<HashMap<String, InterfaceCounters>, ProviderError> {
    let content = fs::read_to_string(PROC_NET_DEV).map_err(|e| ProviderError::Read {
        path: PROC_NET_DEV.to_string(),
        source: e,
    })?;
    Ok(parse_netdev(&content))
}

/// Computes per-interface rates between two counter readings.
///
/// Interfaces without a previous reading are skipped; they get rates on
/// the next round. Counter resets (interface bounce) produce 0, not a
/// negative rate.
pub fn compute_rates(
    previous: &HashMap<String, InterfaceCounters>,
    current: &HashMap<String, InterfaceCounters>,
    elapsed_secs: f64,
) -> Vec<InterfaceRate> {
    if elapsed_secs <= 0.0 {
        return Vec::new();
    }

    let mut rates: Vec<InterfaceRate> = current
        .iter()
        .filter_map(|(name, cur)| {
            let prev = previous.get(name)?;
            let rx = cur.rx_bytes.saturating_sub(prev.rx_bytes) as f64;
            let tx = cur.tx_bytes.saturating_sub(prev.tx_bytes) as f64;
            Some(InterfaceRate {
                name: name.clone(),
                rx_kbps: rx / 1024.0 / elapsed_secs,
                tx_kbps: tx / 1024.0 / elapsed_secs,
            })
        })
        .collect();
    rates.sort_by(|a, b| a.name.cmp(&b.name));
    rates
}

/// Tracks the previous /proc/net/dev reading and derives throughput.
pub struct NetRateTracker {
    previous: Mutex<Option<(Instant, HashMap<String, InterfaceCounters>)>>,
}

impl NetRateTracker {
    pub fn new() -> Self {
        Self {
            previous: Mutex::new(None),
        }
    }

    /// Reads /proc/net/dev and returns per-interface rates against the
    /// previous reading. The first call stores a baseline and fails with
    /// `NotReady`.
    pub fn rates(&self) -> Result<Vec<InterfaceRate>, ProviderError> {
        let current = read_netdev()?;
        let now = Instant::now();

        let mut guard = self
            .previous
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = match guard.as_ref() {
            None => Err(ProviderError::NotReady {
                what: "network throughput",
            }),
            Some((then, previous)) => {
                let elapsed = now.duration_since(*then).as_secs_f64();
                Ok(compute_rates(previous, &current, elapsed))
            }
        };

        *guard = Some((now, current));
        result
    }
}

impl Default for NetRateTracker {
    fn default() -> Self {
        Self::new()
    }
}
