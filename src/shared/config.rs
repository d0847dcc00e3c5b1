//! Keeper configuration: TOML file sections, defaults and validation

use std::fs;
use std::path::Path;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use serde::Deserialize;

use crate::shared::errors::AppError;
use crate::shared::types::Token;

/// Policy knobs for sizing, health monitoring and rebalancing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Share of each wallet balance that may be deployed into a new position
    pub deployable_balance_fraction: f64,
    /// Token share of portfolio value at or below which a rebalance fires
    pub rebalance_threshold: f64,
    /// Consecutive out-of-range cycles before a position is removed
    pub out_of_range_threshold: u32,
    pub monitoring_interval_minutes: u64,
    /// Range half-width in units of tick spacing
    pub tick_range_width: u32,
    pub deadline_buffer_seconds: u64,
    /// Share of portfolio value the underweight token is topped up to
    pub target_allocation_fraction: f64,
    pub slippage_bps: u32,
    /// Deployable raw balance below which sizing refuses to run
    pub dust_floor0: u64,
    pub dust_floor1: u64,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            deployable_balance_fraction: 0.40,
            rebalance_threshold: 0.10,
            out_of_range_threshold: 10,
            monitoring_interval_minutes: 6,
            tick_range_width: 5,
            deadline_buffer_seconds: 300,
            target_allocation_fraction: 0.30,
            slippage_bps: 50,
            dust_floor0: 1,
            dust_floor1: 1,
        }
    }
}

impl KeeperConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        check_fraction("deployable_balance_fraction", self.deployable_balance_fraction)?;
        check_fraction("rebalance_threshold", self.rebalance_threshold)?;
        check_fraction("target_allocation_fraction", self.target_allocation_fraction)?;
        if self.target_allocation_fraction <= self.rebalance_threshold {
            return Err(AppError::ConfigError(format!(
                "target_allocation_fraction ({}) must exceed rebalance_threshold ({})",
                self.target_allocation_fraction, self.rebalance_threshold
            )));
        }
        if self.out_of_range_threshold == 0 {
            return Err(AppError::ConfigError("out_of_range_threshold must be at least 1".to_string()));
        }
        if self.monitoring_interval_minutes == 0 {
            return Err(AppError::ConfigError("monitoring_interval_minutes must be at least 1".to_string()));
        }
        if self.tick_range_width == 0 {
            return Err(AppError::ConfigError("tick_range_width must be at least 1".to_string()));
        }
        if self.slippage_bps >= 10_000 {
            return Err(AppError::ConfigError(format!("slippage_bps {} must be below 10000", self.slippage_bps)));
        }
        Ok(())
    }

    /// Deployable fraction in basis points, so sizing never touches floats
    pub fn deployable_fraction_bps(&self) -> u32 {
        (self.deployable_balance_fraction * 10_000.0).round() as u32
    }

    pub fn monitoring_interval(&self) -> Duration {
        Duration::from_secs(self.monitoring_interval_minutes * 60)
    }

    pub fn slippage_tolerance(&self) -> f64 {
        self.slippage_bps as f64 / 10_000.0
    }

    pub fn dust_floors(&self) -> (U256, U256) {
        (U256::from(self.dust_floor0), U256::from(self.dust_floor1))
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(AppError::ConfigError(format!("{} must be in (0, 1], got {}", name, value)));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolCfg {
    pub address: Address,
    pub fee: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokensCfg {
    pub token0: Token,
    pub token1: Token,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceFeedCfg {
    pub url: String,
    #[serde(default = "default_price_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_price_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotCfg {
    pub path: String,
}

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keeper: KeeperConfig,
    pub pool: PoolCfg,
    pub tokens: TokensCfg,
    pub price_feed: PriceFeedCfg,
    pub snapshot: SnapshotCfg,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, AppError> {
        let cfg: Self = toml::from_str(s)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        cfg.keeper.validate()?;
        if cfg.tokens.token0.address == cfg.tokens.token1.address {
            return Err(AppError::ConfigError("token0 and token1 must differ".to_string()));
        }
        Ok(cfg)
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, AppError> {
        let config_content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Config::from_toml_str(&config_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[keeper]
out_of_range_threshold = 4
tick_range_width = 2

[pool]
address = "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"
fee = 500

[tokens.token0]
address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
symbol = "USDC"
decimals = 6

[tokens.token1]
address = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
symbol = "WETH"
decimals = 18

[price_feed]
url = "http://localhost:8080/prices"

[snapshot]
path = "snapshot.json"
"#;

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = KeeperConfig::default();
        assert_eq!(cfg.deployable_balance_fraction, 0.40);
        assert_eq!(cfg.rebalance_threshold, 0.10);
        assert_eq!(cfg.out_of_range_threshold, 10);
        assert_eq!(cfg.monitoring_interval_minutes, 6);
        assert_eq!(cfg.tick_range_width, 5);
        assert_eq!(cfg.deadline_buffer_seconds, 300);
        assert_eq!(cfg.target_allocation_fraction, 0.30);
        assert_eq!(cfg.deployable_fraction_bps(), 4_000);
        assert_eq!(cfg.monitoring_interval(), Duration::from_secs(360));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_sample_config_with_partial_keeper_section() {
        let cfg = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.keeper.out_of_range_threshold, 4);
        assert_eq!(cfg.keeper.tick_range_width, 2);
        // Unspecified options fall back to defaults
        assert_eq!(cfg.keeper.rebalance_threshold, 0.10);
        assert_eq!(cfg.tokens.token0.symbol, "USDC");
        assert_eq!(cfg.tokens.token1.decimals, 18);
        assert_eq!(cfg.pool.fee, 500);
        assert_eq!(cfg.price_feed.timeout_ms, 10_000);
    }

    #[test]
    fn test_validate_rejects_bad_fractions() {
        let mut cfg = KeeperConfig::default();
        cfg.deployable_balance_fraction = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = KeeperConfig::default();
        cfg.rebalance_threshold = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = KeeperConfig::default();
        cfg.target_allocation_fraction = 0.05;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_counters() {
        let mut cfg = KeeperConfig::default();
        cfg.out_of_range_threshold = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = KeeperConfig::default();
        cfg.monitoring_interval_minutes = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_identical_tokens_rejected() {
        let same = SAMPLE.replace(
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        );
        assert!(Config::from_toml_str(&same).is_err());
    }
}
