//! Temperature collector for thermal zones and hwmon sensors.
//!
//! Sensors are read from:
//! - /sys/class/thermal/thermal_zone*/temp
//! - /sys/class/hwmon/hwmon*/temp*_input
//!
//! Both report millidegrees Celsius. A host without any sensors yields
//! an empty reading, not an error.

use std::fs;
use std::path::Path;

/// One temperature reading, in degrees Celsius.
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub sensor: String,
    pub celsius: f64,
}

fn parse_millidegrees(content: &str) -> Option<f64> {
    let millidegrees: i64 = content.trim().parse().ok()?;
    Some(millidegrees as f64 / 1000.0)
}

/// Reads every thermal zone under /sys/class/thermal.
pub fn read_thermal_zones() -> Vec<SensorReading> {
    let mut readings = Vec::new();
    let base = Path::new("/sys/class/thermal");

    let Ok(entries) = fs::read_dir(base) else {
        return readings;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(zone) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if !zone.starts_with("thermal_zone") {
            continue;
        }

        if let Ok(content) = fs::read_to_string(path.join("temp")) {
            if let Some(celsius) = parse_millidegrees(&content) {
                readings.push(SensorReading {
                    sensor: zone,
                    celsius,
                });
            }
        }
    }

    readings
}

/// Reads every temp*_input sensor under /sys/class/hwmon.
pub fn read_hwmon_sensors() -> Vec<SensorReading> {
    let mut readings = Vec::new();
    let base = Path::new("/sys/class/hwmon");

    let Ok(entries) = fs::read_dir(base) else {
        return readings;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        // Prefer the device name ("coretemp") over the hwmonN directory.
        let device = fs::read_to_string(path.join("name"))
            .map(|n| n.trim().to_string())
            .or_else(|_| {
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or(())
            })
            .unwrap_or_else(|_| "hwmon".to_string());

        let Ok(files) = fs::read_dir(&path) else {
            continue;
        };

        for file in files.flatten() {
            let file_path = file.path();
            let Some(name) = file_path.file_name().map(|n| n.to_string_lossy().to_string())
            else {
                continue;
            };
            if !name.starts_with("temp") || !name.ends_with("_input") {
                continue;
            }

            if let Ok(content) = fs::read_to_string(&file_path) {
                if let Some(celsius) = parse_millidegrees(&content) {
                    readings.push(SensorReading {
                        sensor: format!("{}_{}", device, name.trim_end_matches("_input")),
                        celsius,
                    });
                }
            }
        }
    }

    readings
}

/// Collects all temperature readings, sorted by sensor name.
pub fn read_temperatures() -> Vec<SensorReading> {
    let mut readings = read_thermal_zones();
    readings.extend(read_hwmon_sensors());
    readings.sort_by(|a, b| a.sensor.cmp(&b.sensor));
    readings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_millidegrees() {
        assert_eq!(parse_millidegrees("47000\n"), Some(47.0));
        assert_eq!(parse_millidegrees("-5000"), Some(-5.0));
        assert_eq!(parse_millidegrees("cold"), None);
    }

    #[test]
    fn test_read_temperatures_never_fails() {
        // Works on hosts with and without sensors.
        let readings = read_temperatures();
        for reading in &readings {
            assert!(!reading.sensor.is_empty());
        }
    }
}
