//! Application configuration.

use crate::error::{AppError, AppResult};
use pairmaker_strategy::StrategyConfig;
use serde::{Deserialize, Serialize};

/// Where exchange events are read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// JSON lines file, or `-` for stdin.
    #[serde(default = "default_replay_path")]
    pub path: String,
}

fn default_replay_path() -> String {
    "-".to_string()
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            path: default_replay_path(),
        }
    }
}

/// Sweep ticker. Disabled unless explicitly enabled.
///
/// Each tick sends a one-lot order on each side at the extreme prices the
/// exchange accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Number of ticks to emit.
    #[serde(default = "default_sweep_ticks")]
    pub ticks: u32,
    /// Delay between ticks (ms).
    #[serde(default = "default_sweep_interval_ms")]
    pub interval_ms: u64,
}

fn default_sweep_ticks() -> u32 {
    10
}

fn default_sweep_interval_ms() -> u64 {
    50
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ticks: default_sweep_ticks(),
            interval_ms: default_sweep_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Print the Prometheus text exposition to stderr on exit.
    #[serde(default)]
    pub dump_metrics: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.strategy.validate()?;
        if self.sweep.enabled && self.sweep.interval_ms == 0 {
            return Err(AppError::Config(
                "sweep.interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmaker_core::Instrument;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.replay.path, "-");
        assert!(!config.sweep.enabled);
        assert_eq!(config.sweep.interval_ms, 50);
        assert_eq!(config.strategy.position_limit, 100);
        assert!(!config.telemetry.dump_metrics);
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [strategy]
            tick_size = 50
            hit_enabled = false

            [replay]
            path = "data/session.jsonl"

            [sweep]
            enabled = true
            ticks = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.strategy.tick_size, 50);
        assert!(!config.strategy.hit_enabled);
        assert_eq!(config.strategy.primary, Instrument::Future);
        assert_eq!(config.replay.path, "data/session.jsonl");
        assert!(config.sweep.enabled);
        assert_eq!(config.sweep.ticks, 3);
    }

    #[test]
    fn test_invalid_strategy_rejected() {
        let result = AppConfig::from_toml("[strategy]\nposition_limit = 0\n");
        assert!(matches!(result, Err(AppError::Strategy(_))));
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let result = AppConfig::from_toml("[sweep]\nenabled = true\ninterval_ms = 0\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file("/nonexistent/pairmaker.toml");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_default_config_file_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = AppConfig::from_file(path).unwrap();
        assert_eq!(config.strategy.tick_size, 100);
    }
}
