//! Strategy configuration.
//!
//! All values are fixed when the trader is constructed and are not
//! reloadable.

use pairmaker_core::{Instrument, TickSize, TOP_LEVEL_COUNT};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, StrategyResult};

/// Market making configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Instrument that is quoted.
    #[serde(default = "default_primary")]
    pub primary: Instrument,

    /// Instrument used for hedging.
    #[serde(default = "default_secondary")]
    pub secondary: Instrument,

    /// Minimum price increment in cents.
    #[serde(default = "default_tick_size")]
    pub tick_size: u64,

    /// Hard limit on absolute net position, in lots.
    #[serde(default = "default_position_limit")]
    pub position_limit: i64,

    /// Lot size used for the cancel buffer: resting quotes on the side that
    /// grows the position are pulled once |position| > limit - 2 * lot_size.
    #[serde(default = "default_lot_size")]
    pub lot_size: i64,

    /// Symmetric quote volume per side before inventory skew.
    #[serde(default = "default_base_volume")]
    pub base_volume: i64,

    /// Position beyond which quote volumes are skewed.
    #[serde(default = "default_soft_threshold")]
    pub soft_threshold: i64,

    /// Quote offset from theo at zero inventory, in ticks.
    #[serde(default = "default_skew_base_ticks")]
    pub skew_base_ticks: Decimal,

    /// Floor for the quote offset, in ticks.
    #[serde(default = "default_skew_min_ticks")]
    pub skew_min_ticks: Decimal,

    /// Lots of inventory per tick of price skew.
    #[serde(default = "default_skew_divisor")]
    pub skew_divisor: Decimal,

    /// Send aggressive hit orders sized to the unused headroom.
    #[serde(default = "default_true")]
    pub hit_enabled: bool,

    /// Distance of hit orders from theo, in ticks.
    #[serde(default = "default_hit_offset_ticks")]
    pub hit_offset_ticks: u64,

    /// Book levels blended into theo (1 = top of book only).
    #[serde(default = "default_pricing_levels")]
    pub pricing_levels: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            tick_size: default_tick_size(),
            position_limit: default_position_limit(),
            lot_size: default_lot_size(),
            base_volume: default_base_volume(),
            soft_threshold: default_soft_threshold(),
            skew_base_ticks: default_skew_base_ticks(),
            skew_min_ticks: default_skew_min_ticks(),
            skew_divisor: default_skew_divisor(),
            hit_enabled: true,
            hit_offset_ticks: default_hit_offset_ticks(),
            pricing_levels: default_pricing_levels(),
        }
    }
}

impl StrategyConfig {
    /// Reject configurations the strategy cannot run with.
    pub fn validate(&self) -> StrategyResult<()> {
        if self.primary == self.secondary {
            return Err(StrategyError::InvalidConfig(format!(
                "primary and secondary instruments must differ (both {})",
                self.primary
            )));
        }
        if self.position_limit <= 0 {
            return Err(StrategyError::InvalidConfig(format!(
                "position_limit must be positive, got {}",
                self.position_limit
            )));
        }
        if self.base_volume < 0 || self.lot_size < 0 || self.soft_threshold < 0 {
            return Err(StrategyError::InvalidConfig(
                "base_volume, lot_size and soft_threshold must not be negative".to_string(),
            ));
        }
        if self.skew_divisor.is_zero() {
            return Err(StrategyError::InvalidConfig(
                "skew_divisor must be nonzero".to_string(),
            ));
        }
        if self.pricing_levels == 0 || self.pricing_levels > TOP_LEVEL_COUNT {
            return Err(StrategyError::InvalidConfig(format!(
                "pricing_levels must be within 1..={TOP_LEVEL_COUNT}, got {}",
                self.pricing_levels
            )));
        }
        self.tick()?;
        Ok(())
    }

    /// Tick size as a checked value.
    pub fn tick(&self) -> StrategyResult<TickSize> {
        Ok(TickSize::new(self.tick_size)?)
    }
}

fn default_true() -> bool {
    true
}
fn default_primary() -> Instrument {
    Instrument::Future
}
fn default_secondary() -> Instrument {
    Instrument::Etf
}
fn default_tick_size() -> u64 {
    100 // cents
}
fn default_position_limit() -> i64 {
    100
}
fn default_lot_size() -> i64 {
    10
}
fn default_base_volume() -> i64 {
    40
}
fn default_soft_threshold() -> i64 {
    60
}
fn default_skew_base_ticks() -> Decimal {
    Decimal::new(3, 0)
}
fn default_skew_min_ticks() -> Decimal {
    Decimal::ONE
}
fn default_skew_divisor() -> Decimal {
    Decimal::new(50, 0)
}
fn default_hit_offset_ticks() -> u64 {
    4
}
fn default_pricing_levels() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = StrategyConfig::default();
        assert_eq!(config.primary, Instrument::Future);
        assert_eq!(config.secondary, Instrument::Etf);
        assert_eq!(config.tick_size, 100);
        assert_eq!(config.position_limit, 100);
        assert_eq!(config.lot_size, 10);
        assert_eq!(config.base_volume, 40);
        assert_eq!(config.soft_threshold, 60);
        assert_eq!(config.skew_base_ticks, dec!(3));
        assert_eq!(config.skew_min_ticks, dec!(1));
        assert_eq!(config.skew_divisor, dec!(50));
        assert!(config.hit_enabled);
        assert_eq!(config.hit_offset_ticks, 4);
        assert_eq!(config.pricing_levels, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serde_defaults() {
        let toml_str = r#"
position_limit = 200
skew_divisor = 25
hit_enabled = false
"#;
        let config: StrategyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.position_limit, 200);
        assert_eq!(config.skew_divisor, dec!(25));
        assert!(!config.hit_enabled);
        assert_eq!(config.tick_size, 100);
        assert_eq!(config.secondary, Instrument::Etf);
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = StrategyConfig {
            tick_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(StrategyError::Core(_))));
    }

    #[test]
    fn test_validate_rejects_same_instruments() {
        let config = StrategyConfig {
            secondary: Instrument::Future,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StrategyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_pricing_levels() {
        for levels in [0, 6] {
            let config = StrategyConfig {
                pricing_levels: levels,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "levels={levels}");
        }
    }
}
