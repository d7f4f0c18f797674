//! Normalization of display-formatted provider readings.
//!
//! The snapshot provider hands back readings the way the sensor layer
//! formats them for humans (`"45.00%"`, `"12.34 KB/s"`, `"47.0°C"`).
//! This module turns them into canonical floats: strip the unit marker,
//! parse, clamp to the unit's valid range. A reading that is not numeric
//! after stripping is a per-entity failure; it never aborts the rest of
//! the batch.

use serde::Serialize;

/// Unit of a raw reading, deciding suffix stripping and clamping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Percentage, clamped to `[0, 100]`.
    Percent,
    /// Throughput in KB/s, clamped below at 0.
    KbPerSec,
    /// Temperature in degrees Celsius, clamped below at 0.
    Celsius,
}

impl Unit {
    fn suffix(&self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::KbPerSec => "KB/s",
            Unit::Celsius => "°C",
        }
    }
}

/// A reading rejected by normalization.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NormalizeError {
    #[error("not a numeric reading: {0:?}")]
    NotNumeric(String),
}

/// Normalizes one raw reading into a canonical float.
pub fn parse(unit: Unit, raw: &str) -> Result<f64, NormalizeError> {
    let stripped = raw.trim().trim_end_matches(unit.suffix()).trim();

    let value: f64 = stripped
        .parse()
        .map_err(|_| NormalizeError::NotNumeric(raw.to_string()))?;

    if !value.is_finite() {
        return Err(NormalizeError::NotNumeric(raw.to_string()));
    }

    Ok(match unit {
        Unit::Percent => value.clamp(0.0, 100.0),
        Unit::KbPerSec | Unit::Celsius => value.max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_with_suffix() {
        assert_eq!(parse(Unit::Percent, "45.00%"), Ok(45.0));
        assert_eq!(parse(Unit::Percent, "0.00%"), Ok(0.0));
        assert_eq!(parse(Unit::Percent, "100.00%"), Ok(100.0));
    }

    #[test]
    fn test_percent_without_suffix() {
        // Some providers omit the marker; the numeric part still parses.
        assert_eq!(parse(Unit::Percent, "12.5"), Ok(12.5));
    }

    #[test]
    fn test_percent_clamping() {
        assert_eq!(parse(Unit::Percent, "104.37%"), Ok(100.0));
        assert_eq!(parse(Unit::Percent, "-3.1%"), Ok(0.0));
    }

    #[test]
    fn test_rate_with_suffix() {
        assert_eq!(parse(Unit::KbPerSec, "12.34 KB/s"), Ok(12.34));
        assert_eq!(parse(Unit::KbPerSec, "0.00 KB/s"), Ok(0.0));
    }

    #[test]
    fn test_rate_is_unbounded_above() {
        assert_eq!(parse(Unit::KbPerSec, "125000.50 KB/s"), Ok(125000.5));
    }

    #[test]
    fn test_rate_clamped_below_at_zero() {
        assert_eq!(parse(Unit::KbPerSec, "-1.5 KB/s"), Ok(0.0));
    }

    #[test]
    fn test_celsius() {
        assert_eq!(parse(Unit::Celsius, "47.0°C"), Ok(47.0));
        assert_eq!(parse(Unit::Celsius, "103.5°C"), Ok(103.5));
    }

    #[test]
    fn test_malformed_readings_are_rejected() {
        assert!(parse(Unit::Percent, "N/A").is_err());
        assert!(parse(Unit::Percent, "").is_err());
        assert!(parse(Unit::KbPerSec, "fast").is_err());
        assert!(parse(Unit::Percent, "NaN%").is_err());
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        assert_eq!(parse(Unit::Percent, " 45.00% "), Ok(45.0));
        assert_eq!(parse(Unit::KbPerSec, "12.34  KB/s"), Ok(12.34));
    }
}
