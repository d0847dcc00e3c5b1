//! Position domain - sizing new positions and tracking their range health

mod health_monitor;
mod position_sizer;

pub use health_monitor::PositionHealthMonitor;
pub use position_sizer::{quote_token0_in_token1, PositionSizer, SizerConfig};

use alloy_primitives::U256;

use crate::shared::types::TickRange;

/// Which token's balance limits the position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSide {
    Token0,
    Token1,
}

impl ConstraintSide {
    pub fn other(self) -> Self {
        match self {
            ConstraintSide::Token0 => ConstraintSide::Token1,
            ConstraintSide::Token1 => ConstraintSide::Token0,
        }
    }
}

/// Amounts and range for a new position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizingResult {
    pub amount0: U256,
    pub amount1: U256,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub constraint: ConstraintSide,
}

impl SizingResult {
    pub fn range(&self) -> TickRange {
        TickRange {
            lower: self.tick_lower,
            upper: self.tick_upper,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    InRange,
    OutOfRange,
    Closed,
}

/// Tracked health of one managed position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionHealth {
    pub tick_range: TickRange,
    pub consecutive_out_of_range: u32,
    pub state: HealthState,
}

impl PositionHealth {
    pub fn new(tick_range: TickRange) -> Self {
        Self {
            tick_range,
            consecutive_out_of_range: 0,
            state: HealthState::InRange,
        }
    }
}

/// Outcome of one monitoring observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthVerdict {
    InRange,
    OutOfRange { count: u32, threshold: u32 },
    /// Threshold reached on this observation; emit exactly one removal
    Remove { count: u32 },
    AlreadyClosed,
}

impl HealthVerdict {
    pub fn is_removal(&self) -> bool {
        matches!(self, HealthVerdict::Remove { .. })
    }
}
