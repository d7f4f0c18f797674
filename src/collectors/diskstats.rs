//! Disk I/O throughput collector based on /proc/diskstats deltas.

use std::fs;
use std::sync::Mutex;
use std::time::Instant;

use ahash::AHashMap as HashMap;

use crate::error::ProviderError;

const PROC_DISKSTATS: &str = "/proc/diskstats";

/// Sectors are reported in fixed 512-byte units regardless of the
/// device's physical sector size.
const SECTOR_BYTES: u64 = 512;

/// Cumulative sector counters for one block device.
#[derive(Debug, Clone, Copy)]
pub struct DiskCounters {
    pub sectors_read: u64,
    pub sectors_written: u64,
}

/// Aggregate read/write throughput across all devices, in KB/s.
#[derive(Debug, Clone, Copy)]
pub struct DiskRates {
    pub read_kbps: f64,
    pub write_kbps: f64,
}

/// Parses /proc/diskstats content into per-device sector counters.
///
/// Loop and ram devices are skipped, as are partitions of devices that
/// are already counted whole (nvme0n1p1 when nvme0n1 is present would
/// double-count, so only lines for whole devices matter here; partitions
/// are recognizable by a trailing digit on a name that also exists
/// without it).
pub fn parse_diskstats(content: &str) -> HashMap<String, DiskCounters> {
    let mut counters = HashMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue;
        }

        let device = parts[2].to_string();
        if device.starts_with("loop") || device.starts_with("ram") {
            continue;
        }

        counters.insert(
            device,
            DiskCounters {
                sectors_read: parts[5].parse().unwrap_or(0),
                sectors_written: parts[9].parse().unwrap_or(0),
            },
        );
    }

    // Drop partition entries whose parent device is present.
    let devices: Vec<String> = counters.keys().cloned().collect();
    for name in &devices {
        let trimmed = name.trim_end_matches(|c: char| c.is_ascii_digit());
        let parent = trimmed.strip_suffix('p').unwrap_or(trimmed);
        if parent != name && counters.contains_key(parent) {
            counters.remove(name);
        }
    }

    counters
}

/// Reads current sector counters from /proc/diskstats.
pub fn read_diskstats() -> Result<HashMap<String, DiskCounters>, ProviderError> {
    let content = fs::read_to_string(PROC_DISKSTATS).map_err(|e| ProviderError::Read {
        path: PROC_DISKSTATS.to_string(),
        source: e,
    })?;
    Ok(parse_diskstats(&content))
}

/// Computes aggregate throughput between two counter readings.
pub fn compute_rates(
    previous: &HashMap<String, DiskCounters>,
    current: &HashMap<String, DiskCounters>,
    elapsed_secs: f64,
) -> DiskRates {
    if elapsed_secs <= 0.0 {
        return DiskRates {
            read_kbps: 0.0,
            write_kbps: 0.0,
        };
    }

    let mut read_bytes = 0u64;
    let mut written_bytes = 0u64;

    for (name, cur) in current {
        let Some(prev) = previous.get(name) else {
            continue;
        };
        read_bytes += cur.sectors_read.saturating_sub(prev.sectors_read) * SECTOR_BYTES;
        written_bytes += cur.sectors_written.saturating_sub(prev.sectors_written) * SECTOR_BYTES;
    }

    DiskRates {
        read_kbps: read_bytes as f64 / 1024.0 / elapsed_secs,
        write_kbps: written_bytes as f64 / 1024.0 / elapsed_secs,
    }
}

/// Tracks the previous /proc/diskstats reading and derives throughput.
pub struct DiskRateTracker {
    previous: Mutex<Option<(Instant, HashMap<String, DiskCounters>)>>,
}

impl DiskRateTracker {
    pub fn new() -> Self {
        Self {
            previous: Mutex::new(None),
        }
    }

    /// Reads /proc/diskstats and returns aggregate rates against the
    /// previous reading, or None on the first call (baseline only).
    pub fn rates(&self) -> Result<Option<DiskRates>, ProviderError> {
        let current = read_diskstats()?;
        let now = Instant::now();

        let mut guard = self
            .previous
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let result = guard.as_ref().map(|(then, previous)| {
            let elapsed = now.duration_since(*then).as_secs_f64();
            compute_rates(previous, &current, elapsed)
        });

        *guard = Some((now, current));
        Ok(result)
    }
}

impl Default for DiskRateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
   8       0 sda 1000 0 204800 500 2000 0 409600 900 0 600 1400
   8       1 sda1 900 0 204000 480 1900 0 409000 880 0 580 1360
   7       0 loop0 10 0 80 1 0 0 0 0 0 1 1
 259       0 nvme0n1 5000 0 102400 300 1000 0 51200 200 0 250 500
";

    #[test]
    fn test_parse_skips_loop_and_partitions() {
        let counters = parse_diskstats(SAMPLE);
        assert!(counters.contains_key("sda"));
        assert!(counters.contains_key("nvme0n1"));
        assert!(!counters.contains_key("sda1"));
        assert!(!counters.contains_key("loop0"));
    }

    #[test]
    fn test_compute_rates() {
        let previous = parse_diskstats(SAMPLE);
        let mut current = previous.clone();
        // +2048 sectors read on sda = 1 MiB.
        current.get_mut("sda").unwrap().sectors_read += 2048;
        // +1024 sectors written on nvme0n1 = 512 KiB.
        current.get_mut("nvme0n1").unwrap().sectors_written += 1024;

        let rates = compute_rates(&previous, &current, 2.0);
        assert!((rates.read_kbps - 512.0).abs() < 1e-9);
        assert!((rates.write_kbps - 256.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed() {
        let counters = parse_diskstats(SAMPLE);
        let rates = compute_rates(&counters, &counters, 0.0);
        assert_eq!(rates.read_kbps, 0.0);
        assert_eq!(rates.write_kbps, 0.0);
    }
}
