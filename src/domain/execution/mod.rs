//! Execution domain - requests handed to the transaction-submission collaborator

mod request_builder;

pub use request_builder::RequestBuilder;

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::types::PositionId;

/// Mint a new position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePositionRequest {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub amount0: U256,
    pub amount1: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub slippage_tolerance: f64,
    pub deadline: DateTime<Utc>,
}

/// Withdraw all liquidity of a position, collect and burn it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemovePositionRequest {
    pub position_id: PositionId,
    pub slippage_tolerance: f64,
    pub deadline: DateTime<Utc>,
}

/// Exact-input swap through the managed pool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub amount_in: U256,
    pub slippage_tolerance: f64,
    pub deadline: DateTime<Utc>,
}
