//! CPU load collector based on /proc/stat deltas.
//!
//! A single reading of /proc/stat only gives cumulative tick counters;
//! usable load ratios need the delta between two readings. The
//! `CpuLoadTracker` keeps the previous reading and turns each new one
//! into per-core and overall usage ratios.

use std::fs;
use std::sync::Mutex;

use ahash::AHashMap as HashMap;

use crate::error::ProviderError;

const PROC_STAT: &str = "/proc/stat";

/// Cumulative CPU time counters for one cpu line of /proc/stat.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Total CPU time across all fields.
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }

    /// Non-active time (idle + iowait).
    pub fn idle_total(&self) -> u64 {
        self.idle + self.iowait
    }
}

/// Load ratios derived from two consecutive /proc/stat readings.
#[derive(Debug, Clone)]
pub struct CpuLoad {
    /// Busy ratio in `[0, 1]` across all cores.
    pub overall: f64,
    /// Idle ratio in `[0, 1]` across all cores.
    pub idle: f64,
    /// Busy ratio per core, keyed by core index, sorted ascending.
    pub per_core: Vec<(usize, f64)>,
}

/// Parses the cpu lines of /proc/stat content.
///
/// Returns a map keyed by cpu name: "cpu" is the all-core aggregate,
/// "cpu0", "cpu1", ... are individual cores.
pub fn parse_cpu_times(content: &str) -> Result<HashMap<String, CpuTimes>, ProviderError> {
    let mut times = HashMap::new();

    for line in content.lines() {
        if !line.starts_with("cpu") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 8 {
            continue;
        }

        let field = |idx: usize| parts.get(idx).and_then(|p| p.parse().ok()).unwrap_or(0);

        times.insert(
            parts[0].to_string(),
            CpuTimes {
                user: field(1),
                nice: field(2),
                system: field(3),
                idle: field(4),
                iowait: field(5),
                irq: field(6),
                softirq: field(7),
                steal: field(8),
            },
        );
    }

    if times.is_empty() {
        return Err(ProviderError::Format {
            path: PROC_STAT.to_string(),
            detail: "no cpu lines found".to_string(),
        });
    }

    Ok(times)
}

/// Reads and parses the current CPU time counters from /proc/stat.
pub fn read_cpu_times() -> Result<HashMap<String, CpuTimes>, ProviderError> {
    let content = fs::read_to_string(PROC_STAT).map_err(|e| ProviderError::Read {
        path: PROC_STAT.to_string(),
        source: e,
    })?;
    parse_cpu_times(&content)
}

/// Computes the busy ratio of one cpu between two readings.
///
/// Returns None when no time passed between the readings.
fn busy_ratio(previous: &CpuTimes, current: &CpuTimes) -> Option<f64> {
    let delta_total = current.total().saturating_sub(previous.total());
    if delta_total == 0 {
        return None;
    }
    let delta_idle = current.idle_total().saturating_sub(previous.idle_total());
    Some((delta_total - delta_idle) as f64 / delta_total as f64)
}

/// Tracks the previous /proc/stat reading and derives load ratios.
pub struct CpuLoadTracker {
    previous: Mutex<Option<HashMap<String, CpuTimes>>>,
}

impl CpuLoadTracker {
    pub fn new() -> Self {
        Self {
            previous: Mutex::new(None),
        }
    }

    /// Reads /proc/stat and returns load ratios against the previous
    /// reading. The first call stores a baseline and fails with
    /// `NotReady`; the next tick succeeds.
    pub fn load(&self) -> Result<CpuLoad, ProviderError> {
        let current = read_cpu_times()?;
        self.advance(current)
    }

    /// Delta calculation, split from I/O so tests can feed readings in.
    pub fn advance(&self, current: HashMap<String, CpuTimes>) -> Result<CpuLoad, ProviderError> {
        let mut guard = self
            .previous
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = match guard.as_ref() {
            None => Err(ProviderError::NotReady { what: "cpu load" }),
            Some(previous) => {
                let aggregate = match (previous.get("cpu"), current.get("cpu")) {
                    (Some(p), Some(c)) => busy_ratio(p, c),
                    _ => None,
                };

                let mut per_core: Vec<(usize, f64)> = current
                    .iter()
                    .filter_map(|(name, cur)| {
                        let index: usize = name.strip_prefix("cpu")?.parse().ok()?;
                        let prev = previous.get(name)?;
                        busy_ratio(prev, cur).map(|ratio| (index, ratio))
                    })
                    .collect();
                per_core.sort_by_key(|(index, _)| *index);

                match aggregate {
                    Some(overall) => Ok(CpuLoad {
                        overall,
                        idle: 1.0 - overall,
                        per_core,
                    }),
                    None => Err(ProviderError::NotReady { what: "cpu load" }),
                }
            }
        };

        *guard = Some(current);
        result
    }
}

impl Default for CpuLoadTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(user: u64, idle: u64) -> CpuTimes {
        CpuTimes {
            user,
            idle,
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_cpu_times() {
        let content = "cpu  100 0 50 800 10 0 5 0 0 0\n\
                       cpu0 50 0 25 400 5 0 2 0 0 0\n\
                       cpu1 50 0 25 400 5 0 3 0 0 0\n\
                       intr 12345\n";
        let parsed = parse_cpu_times(content).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed["cpu"].user, 100);
        assert_eq!(parsed["cpu1"].softirq, 3);
    }

    #[test]
    fn test_parse_rejects_missing_cpu_lines() {
        assert!(parse_cpu_times("intr 1 2 3\nctxt 42\n").is_err());
    }

    #[test]
    fn test_first_reading_is_not_ready() {
        let tracker = CpuLoadTracker::new();
        let mut reading = HashMap::new();
        reading.insert("cpu".to_string(), times(100, 900));

        let err = tracker.advance(reading).unwrap_err();
        assert!(matches!(err, ProviderError::NotReady { .. }));
    }

    #[test]
    fn test_delta_produces_ratios() {
        let tracker = CpuLoadTracker::new();

        let mut first = HashMap::new();
        first.insert("cpu".to_string(), times(100, 900));
        first.insert("cpu0".to_string(), times(100, 900));
        let _ = tracker.advance(first);

        let mut second = HashMap::new();
        // +50 busy, +50 idle: 50% load.
        second.insert("cpu".to_string(), times(150, 950));
        // +75 busy, +25 idle: 75% load.
        second.insert("cpu0".to_string(), times(175, 925));

        let load = tracker.advance(second).unwrap();
        assert!((load.overall - 0.5).abs() < 1e-9);
        assert!((load.idle - 0.5).abs() < 1e-9);
        assert_eq!(load.per_core.len(), 1);
        assert_eq!(load.per_core[0].0, 0);
        assert!((load.per_core[0].1 - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_core_set_growth_between_readings() {
        let tracker = CpuLoadTracker::new();

        let mut first = HashMap::new();
        first.insert("cpu".to_string(), times(100, 900));
        first.insert("cpu0".to_string(), times(100, 900));
        let _ = tracker.advance(first);

        // cpu1 comes online; it has no baseline so it is skipped this round.
        let mut second = HashMap::new();
        second.insert("cpu".to_string(), times(200, 1000));
        second.insert("cpu0".to_string(), times(150, 950));
        second.insert("cpu1".to_string(), times(50, 50));

        let load = tracker.advance(second).unwrap();
        assert_eq!(load.per_core.len(), 1);

        // The round after, cpu1 has a baseline and shows up.
        let mut third = HashMap::new();
        third.insert("cpu".to_string(), times(300, 1100));
        third.insert("cpu0".to_string(), times(200, 1000));
        third.insert("cpu1".to_string(), times(100, 100));

        let load = tracker.advance(third).unwrap();
        assert_eq!(load.per_core.len(), 2);
    }
}
