//! Common types used across the application

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::shared::errors::{KeeperError, KeeperResult};

/// Token representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Identifier of a managed position (the position NFT token id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub U256);

impl PositionId {
    pub fn new(id: u64) -> Self {
        Self(U256::from(id))
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of the pool's current price state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolState {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
    pub tick_spacing: i32,
    /// Fee tier in hundredths of a basis point (3000 = 0.30%)
    pub fee: u32,
}

/// Closed tick interval; a tick equal to either bound counts as inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    pub lower: i32,
    pub upper: i32,
}

impl TickRange {
    pub fn new(lower: i32, upper: i32) -> KeeperResult<Self> {
        if lower >= upper {
            return Err(KeeperError::InvalidTickRange(format!(
                "lower {} must be below upper {}",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, tick: i32) -> bool {
        self.lower <= tick && tick <= self.upper
    }

    pub fn is_aligned(&self, tick_spacing: i32) -> bool {
        tick_spacing > 0 && self.lower % tick_spacing == 0 && self.upper % tick_spacing == 0
    }

    pub fn width(&self) -> i32 {
        self.upper - self.lower
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

/// Raw wallet balances of the two pool tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancePair {
    pub raw0: U256,
    pub raw1: U256,
    pub decimals0: u8,
    pub decimals1: u8,
}

/// Observation of a live position against the pool's current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSnapshot {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub current_tick: i32,
}

impl PositionSnapshot {
    pub fn range(&self) -> TickRange {
        TickRange {
            lower: self.tick_lower,
            upper: self.tick_upper,
        }
    }

    pub fn is_in_range(&self) -> bool {
        self.range().contains(self.current_tick)
    }
}
