//! Configuration management for hostpulse.
//!
//! Handles loading, merging, and validating configuration from files
//! and CLI arguments. Supports YAML, JSON, and TOML formats with the
//! precedence CLI > config file > defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cli::{Args, ConfigFormat};
use crate::registry::MetricCategory;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
/// Polling cadence of the dashboard the service was built for.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
/// Rolling window per series: one minute of history at the default cadence.
pub const DEFAULT_WINDOW: usize = 60;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 800;

/// Service configuration. Every field is optional so partial config
/// files merge cleanly; accessors apply the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Sampling
    #[serde(alias = "interval-ms")]
    pub interval_ms: Option<u64>,
    #[serde(alias = "window")]
    pub window: Option<usize>,
    #[serde(alias = "acquire-timeout-ms")]
    pub acquire_timeout_ms: Option<u64>,

    // Category enable flags
    #[serde(alias = "enable-cpu")]
    pub enable_cpu: Option<bool>,
    #[serde(alias = "enable-memory")]
    pub enable_memory: Option<bool>,
    #[serde(alias = "enable-disk")]
    pub enable_disk: Option<bool>,
    #[serde(alias = "enable-network")]
    pub enable_network: Option<bool>,
    #[serde(alias = "enable-temperature")]
    pub enable_temperature: Option<bool>,

    /// Use the synthetic provider instead of /proc (demos, non-Linux dev).
    pub synthetic: Option<bool>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_PORT),
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            interval_ms: Some(DEFAULT_INTERVAL_MS),
            window: Some(DEFAULT_WINDOW),
            acquire_timeout_ms: Some(DEFAULT_ACQUIRE_TIMEOUT_MS),
            enable_cpu: Some(true),
            enable_memory: Some(true),
            enable_disk: Some(true),
            enable_network: Some(true),
            enable_temperature: Some(true),
            synthetic: Some(false),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS))
    }

    pub fn window(&self) -> usize {
        self.window.unwrap_or(DEFAULT_WINDOW)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_MS))
    }

    pub fn synthetic(&self) -> bool {
        self.synthetic.unwrap_or(false)
    }

    pub fn category_enabled(&self, category: MetricCategory) -> bool {
        match category {
            MetricCategory::Cpu => self.enable_cpu.unwrap_or(true),
            MetricCategory::Memory => self.enable_memory.unwrap_or(true),
            MetricCategory::Disk => self.enable_disk.unwrap_or(true),
            MetricCategory::Network => self.enable_network.unwrap_or(true),
            MetricCategory::Temperature => self.enable_temperature.unwrap_or(true),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.interval_ms == Some(0) {
        return Err("interval_ms must be greater than 0".into());
    }
    if cfg.window == Some(0) {
        return Err("window must be greater than 0".into());
    }
    if cfg.acquire_timeout_ms == Some(0) {
        return Err("acquire_timeout_ms must be greater than 0".into());
    }

    if cfg.acquire_timeout() >= cfg.interval() {
        return Err(format!(
            "acquire_timeout_ms ({}) must be smaller than interval_ms ({})",
            cfg.acquire_timeout().as_millis(),
            cfg.interval().as_millis()
        )
        .into());
    }

    if !MetricCategory::ALL.iter().any(|c| cfg.category_enabled(*c)) {
        return Err("at least one metric category must be enabled".into());
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// Precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if args.interval_ms.is_some() {
        config.interval_ms = args.interval_ms;
    }
    if args.window.is_some() {
        config.window = args.window;
    }
    if args.acquire_timeout_ms.is_some() {
        config.acquire_timeout_ms = args.acquire_timeout_ms;
    }

    // Category flags: CLI can only disable; everything defaults to on.
    if args.disable_cpu {
        config.enable_cpu = Some(false);
    }
    if args.disable_memory {
        config.enable_memory = Some(false);
    }
    if args.disable_disk {
        config.enable_disk = Some(false);
    }
    if args.disable_network {
        config.enable_network = Some(false);
    }
    if args.disable_temperature {
        config.enable_temperature = Some(false);
    }

    if args.synthetic {
        config.synthetic = Some(true);
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(format!("{:?}", level).to_lowercase());
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/hostpulse/hostpulse.yaml",
            "/etc/hostpulse/hostpulse.yml",
            "/etc/hostpulse/hostpulse.json",
            "./hostpulse.yaml",
            "./hostpulse.yml",
            "./hostpulse.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.port(), DEFAULT_PORT);
        assert_eq!(cfg.interval(), Duration::from_millis(1000));
        assert_eq!(cfg.window(), 60);
        assert!(cfg.category_enabled(MetricCategory::Cpu));
        assert!(!cfg.synthetic());
        assert!(validate_effective_config(&cfg).is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let cfg = Config {
            window: Some(0),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_validation_rejects_timeout_over_interval() {
        let cfg = Config {
            interval_ms: Some(500),
            acquire_timeout_ms: Some(500),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_validation_rejects_all_categories_disabled() {
        let cfg = Config {
            enable_cpu: Some(false),
            enable_memory: Some(false),
            enable_disk: Some(false),
            enable_network: Some(false),
            enable_temperature: Some(false),
            ..Config::default()
        };
        assert!(validate_effective_config(&cfg).is_err());
    }
}
