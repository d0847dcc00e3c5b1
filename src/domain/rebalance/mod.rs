//! Rebalance domain - portfolio valuation and the swap policy

mod rebalance_decider;

pub use rebalance_decider::{RebalanceDecider, RebalancePolicy};

use alloy_primitives::U256;

/// USD valuation of the wallet's two holdings, recomputed each evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioSnapshot {
    pub price0_usd: f64,
    pub price1_usd: f64,
    pub value0_usd: f64,
    pub value1_usd: f64,
    pub total_usd: f64,
    pub ratio0: f64,
    pub ratio1: f64,
}

/// Which token is sold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    Token0ForToken1,
    Token1ForToken0,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebalanceAction {
    pub direction: SwapDirection,
    /// Raw units of the token being sold
    pub amount_in: U256,
    pub amount_in_usd: f64,
}
