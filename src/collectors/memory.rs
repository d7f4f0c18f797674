//! Memory usage collector based on /proc/meminfo.

use std::fs;

use crate::error::ProviderError;

const PROC_MEMINFO: &str = "/proc/meminfo";

/// Memory totals read from /proc/meminfo, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_free_bytes: u64,
}

impl MemoryInfo {
    /// Used memory ratio in `[0, 1]`.
    pub fn used_ratio(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.available_bytes);
        used as f64 / self.total_bytes as f64
    }

    /// Used swap ratio in `[0, 1]`; 0 on hosts without swap.
    pub fn swap_used_ratio(&self) -> f64 {
        if self.swap_total_bytes == 0 {
            return 0.0;
        }
        let used = self.swap_total_bytes.saturating_sub(self.swap_free_bytes);
        used as f64 / self.swap_total_bytes as f64
    }
}

/// Extracts the kB value of a "Label:   12345 kB" meminfo line.
fn parse_kb_value(line: &str, label: &str) -> Option<u64> {
    let rest = line.strip_prefix(label)?;
    let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
    Some(kb * 1024)
}

/// Parses /proc/meminfo content into memory totals.
pub fn parse_meminfo(content: &str) -> Result<MemoryInfo, ProviderError> {
    let mut total = None;
    let mut available = None;
    let mut swap_total = None;
    let mut swap_free = None;

    for line in content.lines() {
        if total.is_none() {
            total = parse_kb_value(line, "MemTotal:");
        }
        if available.is_none() {
            available = parse_kb_value(line, "MemAvailable:");
        }
        if swap_total.is_none() {
            swap_total = parse_kb_value(line, "SwapTotal:");
        }
        if swap_free.is_none() {
            swap_free = parse_kb_value(line, "SwapFree:");
        }
        if total.is_some() && available.is_some() && swap_total.is_some() && swap_free.is_some() {
            break;
        }
    }

    match (total, available, swap_total, swap_free) {
        (Some(total_bytes), Some(available_bytes), Some(swap_total_bytes), Some(swap_free_bytes)) => {
            Ok(MemoryInfo {
                total_bytes,
                available_bytes,
                swap_total_bytes,
                swap_free_bytes,
            })
        }
        _ => Err(ProviderError::Format {
            path: PROC_MEMINFO.to_string(),
            detail: "missing MemTotal/MemAvailable/SwapTotal/SwapFree".to_string(),
        }),
    }
}

/// Reads and parses current memory totals from /proc/meminfo.
pub fn read_meminfo() -> Result<MemoryInfo, ProviderError> {
    let content = fs::read_to_string(PROC_MEMINFO).map_err(|e| ProviderError::Read {
        path: PROC_MEMINFO.to_string(),
        source: e,
    })?;
    parse_meminfo(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "MemTotal:       16384000 kB\n\
                          MemFree:         1024000 kB\n\
                          MemAvailable:    8192000 kB\n\
                          Buffers:          512000 kB\n\
                          SwapTotal:       4096000 kB\n\
                          SwapFree:        4096000 kB\n";

    #[test]
    fn test_parse_meminfo() {
        let info = parse_meminfo(SAMPLE).unwrap();
        assert_eq!(info.total_bytes, 16384000 * 1024);
        assert_eq!(info.available_bytes, 8192000 * 1024);
        assert!((info.used_ratio() - 0.5).abs() < 1e-9);
        assert_eq!(info.swap_used_ratio(), 0.0);
    }

    #[test]
    fn test_swap_used_ratio() {
        let info = MemoryInfo {
            total_bytes: 100,
            available_bytes: 100,
            swap_total_bytes: 1000,
            swap_free_bytes: 750,
        };
        assert!((info.swap_used_ratio() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_no_swap_host() {
        let info = MemoryInfo {
            total_bytes: 100,
            available_bytes: 40,
            swap_total_bytes: 0,
            swap_free_bytes: 0,
        };
        assert_eq!(info.swap_used_ratio(), 0.0);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let result = parse_meminfo("MemTotal: 1000 kB\n");
        assert!(result.is_err());
    }
}
