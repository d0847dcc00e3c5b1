//! Loosely typed payloads as read from the chain, and their conversion
//! into the core types. Big integers travel as decimal strings.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::domain::math::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::shared::errors::{ChainError, KeeperError};
use crate::shared::types::{BalancePair, PoolState, PositionSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPoolState {
    pub sqrt_price_x96: String,
    pub tick: i32,
    pub liquidity: String,
    pub tick_spacing: i32,
    pub fee: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBalances {
    pub amount0: String,
    pub amount1: String,
    pub decimals0: u8,
    pub decimals1: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPosition {
    pub tick_lower: i32,
    pub tick_upper: i32,
    #[serde(default)]
    pub liquidity: Option<String>,
}

fn parse_u256(field: &str, value: &str) -> Result<U256, ChainError> {
    U256::from_str_radix(value.trim(), 10)
        .map_err(|e| ChainError::InvalidPayload(format!("{} '{}' is not a decimal integer: {}", field, value, e)))
}

fn parse_u128(field: &str, value: &str) -> Result<u128, ChainError> {
    value
        .trim()
        .parse::<u128>()
        .map_err(|e| ChainError::InvalidPayload(format!("{} '{}' is not a u128: {}", field, value, e)))
}

fn check_tick(tick: i32) -> Result<i32, KeeperError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(KeeperError::InvalidTick(tick));
    }
    Ok(tick)
}

impl TryFrom<RawPoolState> for PoolState {
    type Error = ChainError;

    fn try_from(raw: RawPoolState) -> Result<Self, Self::Error> {
        let sqrt_price_x96 = parse_u256("sqrt_price_x96", &raw.sqrt_price_x96)?;
        let liquidity = parse_u128("liquidity", &raw.liquidity)?;

        if sqrt_price_x96.is_zero() {
            return Err(KeeperError::StalePoolData("pool reports a zero sqrt price".to_string()).into());
        }
        if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
            return Err(KeeperError::InvalidSqrtPrice(sqrt_price_x96.to_string()).into());
        }
        if liquidity == 0 {
            return Err(KeeperError::StalePoolData("pool has no active liquidity".to_string()).into());
        }
        if raw.tick_spacing <= 0 {
            return Err(ChainError::InvalidPayload(format!(
                "tick_spacing must be positive, got {}",
                raw.tick_spacing
            )));
        }

        Ok(PoolState {
            sqrt_price_x96,
            tick: check_tick(raw.tick)?,
            liquidity,
            tick_spacing: raw.tick_spacing,
            fee: raw.fee,
        })
    }
}

impl TryFrom<RawBalances> for BalancePair {
    type Error = ChainError;

    fn try_from(raw: RawBalances) -> Result<Self, Self::Error> {
        Ok(BalancePair {
            raw0: parse_u256("amount0", &raw.amount0)?,
            raw1: parse_u256("amount1", &raw.amount1)?,
            decimals0: raw.decimals0,
            decimals1: raw.decimals1,
        })
    }
}

impl RawPosition {
    /// Pair the position's range with the pool's current tick
    pub fn into_snapshot(self, current_tick: i32) -> Result<PositionSnapshot, ChainError> {
        let tick_lower = check_tick(self.tick_lower)?;
        let tick_upper = check_tick(self.tick_upper)?;
        if tick_lower >= tick_upper {
            return Err(KeeperError::InvalidTickRange(format!(
                "position lower {} must be below upper {}",
                tick_lower, tick_upper
            ))
            .into());
        }
        Ok(PositionSnapshot {
            tick_lower,
            tick_upper,
            current_tick: check_tick(current_tick)?,
        })
    }
}
