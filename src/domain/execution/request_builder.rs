//! Builds collaborator requests from core decisions

use alloy_primitives::U256;
use chrono::{DateTime, Duration, Utc};

use super::{CreatePositionRequest, RemovePositionRequest, SwapRequest};
use crate::domain::math::mul_div;
use crate::domain::position::SizingResult;
use crate::domain::rebalance::{RebalanceAction, SwapDirection};
use crate::shared::config::KeeperConfig;
use crate::shared::errors::KeeperResult;
use crate::shared::types::{PositionId, Token};

const BPS_DENOMINATOR: u64 = 10_000;

/// Stamps requests with token addresses, slippage and a deadline
pub struct RequestBuilder {
    token0: Token,
    token1: Token,
    fee: u32,
    slippage_bps: u32,
    deadline_buffer: Duration,
}

impl RequestBuilder {
    pub fn new(token0: Token, token1: Token, fee: u32, config: &KeeperConfig) -> Self {
        Self {
            token0,
            token1,
            fee,
            slippage_bps: config.slippage_bps,
            deadline_buffer: Duration::seconds(config.deadline_buffer_seconds as i64),
        }
    }

    pub fn token0(&self) -> &Token {
        &self.token0
    }

    pub fn token1(&self) -> &Token {
        &self.token1
    }

    fn slippage_tolerance(&self) -> f64 {
        self.slippage_bps as f64 / BPS_DENOMINATOR as f64
    }

    fn deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.deadline_buffer
    }

    /// Minimum acceptable amount after slippage, rounded down
    pub fn min_amount(&self, amount: U256) -> KeeperResult<U256> {
        mul_div(
            amount,
            U256::from(BPS_DENOMINATOR - self.slippage_bps as u64),
            U256::from(BPS_DENOMINATOR),
        )
    }

    pub fn create_position(&self, sizing: &SizingResult, now: DateTime<Utc>) -> KeeperResult<CreatePositionRequest> {
        Ok(CreatePositionRequest {
            token0: self.token0.address,
            token1: self.token1.address,
            fee: self.fee,
            amount0: sizing.amount0,
            amount1: sizing.amount1,
            amount0_min: self.min_amount(sizing.amount0)?,
            amount1_min: self.min_amount(sizing.amount1)?,
            tick_lower: sizing.tick_lower,
            tick_upper: sizing.tick_upper,
            slippage_tolerance: self.slippage_tolerance(),
            deadline: self.deadline(now),
        })
    }

    pub fn remove_position(&self, position_id: PositionId, now: DateTime<Utc>) -> RemovePositionRequest {
        RemovePositionRequest {
            position_id,
            slippage_tolerance: self.slippage_tolerance(),
            deadline: self.deadline(now),
        }
    }

    pub fn swap(&self, action: &RebalanceAction, now: DateTime<Utc>) -> SwapRequest {
        let (token_in, token_out) = match action.direction {
            SwapDirection::Token0ForToken1 => (&self.token0, &self.token1),
            SwapDirection::Token1ForToken0 => (&self.token1, &self.token0),
        };
        SwapRequest {
            token_in: token_in.address,
            token_out: token_out.address,
            fee: self.fee,
            amount_in: action.amount_in,
            slippage_tolerance: self.slippage_tolerance(),
            deadline: self.deadline(now),
        }
    }
}
