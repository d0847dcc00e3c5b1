//! Position sizing: pick a range and the largest deployable amount pair

use alloy_primitives::U256;
use tracing::debug;

use super::{ConstraintSide, SizingResult};
use crate::domain::math::{
    amounts_for_liquidity, liquidity_for_amount0, liquidity_for_amount1, mul_div, nearest_usable_tick,
    sqrt_price_at_tick,
};
use crate::shared::config::KeeperConfig;
use crate::shared::errors::{KeeperError, KeeperResult};
use crate::shared::types::{BalancePair, PoolState};

const BPS_DENOMINATOR: u64 = 10_000;
const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);
const Q192: U256 = U256::from_limbs([0, 0, 0, 1]);

/// Sizing knobs, derived from the keeper configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizerConfig {
    pub deployable_fraction_bps: u32,
    pub tick_range_width: u32,
    pub dust_floor0: U256,
    pub dust_floor1: U256,
}

impl From<&KeeperConfig> for SizerConfig {
    fn from(cfg: &KeeperConfig) -> Self {
        let (dust_floor0, dust_floor1) = cfg.dust_floors();
        Self {
            deployable_fraction_bps: cfg.deployable_fraction_bps(),
            tick_range_width: cfg.tick_range_width,
            dust_floor0,
            dust_floor1,
        }
    }
}

/// Value `amount0` of token0 in token1 units at `sqrt_price_x96`, rounded down.
///
/// Uses the X192 price when the sqrt price fits in 128 bits and falls back to
/// an X128 price otherwise so the squared price never overflows.
pub fn quote_token0_in_token1(amount0: U256, sqrt_price_x96: U256) -> KeeperResult<U256> {
    if sqrt_price_x96 <= U256::from(u128::MAX) {
        let ratio_x192 = sqrt_price_x96 * sqrt_price_x96;
        mul_div(ratio_x192, amount0, Q192)
    } else {
        let ratio_x128 = mul_div(sqrt_price_x96, sqrt_price_x96, U256::from(1u8) << 64)?;
        mul_div(ratio_x128, amount0, Q128)
    }
}

pub struct PositionSizer {
    config: SizerConfig,
}

impl PositionSizer {
    pub fn new(config: SizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    /// Apply the deployable fraction to both raw balances and enforce the dust floors
    pub fn deployable_balances(&self, balances: &BalancePair) -> KeeperResult<(U256, U256)> {
        let bps = U256::from(self.config.deployable_fraction_bps);
        let denominator = U256::from(BPS_DENOMINATOR);
        let bal0 = mul_div(balances.raw0, bps, denominator)?;
        let bal1 = mul_div(balances.raw1, bps, denominator)?;

        if bal0 < self.config.dust_floor0 {
            return Err(KeeperError::InsufficientBalance(format!(
                "token0 deployable {} below dust floor {}",
                bal0, self.config.dust_floor0
            )));
        }
        if bal1 < self.config.dust_floor1 {
            return Err(KeeperError::InsufficientBalance(format!(
                "token1 deployable {} below dust floor {}",
                bal1, self.config.dust_floor1
            )));
        }
        Ok((bal0, bal1))
    }

    /// Size a new position around the pool's current tick.
    ///
    /// The token whose deployable balance is worth less binds: it is deployed
    /// in full and the counterpart is derived from the resulting liquidity.
    pub fn size(&self, pool: &PoolState, balances: &BalancePair) -> KeeperResult<SizingResult> {
        let (bal0, bal1) = self.deployable_balances(balances)?;

        let range = nearest_usable_tick(pool.tick, pool.tick_spacing, self.config.tick_range_width)?;
        if range.lower >= range.upper {
            return Err(KeeperError::InvalidTickRange(range.to_string()));
        }

        if pool.sqrt_price_x96.is_zero() {
            return Err(KeeperError::StalePoolData("pool reports a zero sqrt price".to_string()));
        }
        if pool.liquidity == 0 {
            return Err(KeeperError::StalePoolData("pool reports zero active liquidity".to_string()));
        }

        let sqrt_lower = sqrt_price_at_tick(range.lower)?;
        let sqrt_upper = sqrt_price_at_tick(range.upper)?;
        let sqrt_price = pool.sqrt_price_x96;

        if sqrt_price == sqrt_upper {
            return Err(KeeperError::PriceAtRangeBoundary(range.upper));
        }
        if sqrt_price == sqrt_lower {
            return Err(KeeperError::PriceAtRangeBoundary(range.lower));
        }
        if sqrt_price < sqrt_lower || sqrt_price > sqrt_upper {
            return Err(KeeperError::StalePoolData(format!(
                "sqrt price {} inconsistent with tick {} (range {})",
                sqrt_price, pool.tick, range
            )));
        }

        let value0 = quote_token0_in_token1(bal0, sqrt_price)?;
        let preferred = if value0 < bal1 {
            ConstraintSide::Token0
        } else {
            ConstraintSide::Token1
        };
        debug!(
            "Sizing in {}: value0={} bal1={} -> {:?} binds",
            range, value0, bal1, preferred
        );

        let bounds = SolveBounds {
            sqrt_price,
            sqrt_lower,
            sqrt_upper,
            bal0,
            bal1,
        };

        let (amount0, amount1, liquidity, constraint) = match bounds.solve(preferred)? {
            Some(solved) => solved,
            None => {
                let fallback = preferred.other();
                debug!("Counterpart exceeds balance with {:?} binding; trying {:?}", preferred, fallback);
                bounds.solve(fallback)?.ok_or_else(|| {
                    KeeperError::InsufficientBalance(format!(
                        "no binding side fits balances ({}, {})",
                        bal0, bal1
                    ))
                })?
            }
        };

        Ok(SizingResult {
            amount0,
            amount1,
            tick_lower: range.lower,
            tick_upper: range.upper,
            liquidity,
            constraint,
        })
    }
}

struct SolveBounds {
    sqrt_price: U256,
    sqrt_lower: U256,
    sqrt_upper: U256,
    bal0: U256,
    bal1: U256,
}

impl SolveBounds {
    /// Deploy the binding balance in full and derive the counterpart (rounded up).
    /// `None` when the counterpart would exceed its own balance.
    fn solve(&self, side: ConstraintSide) -> KeeperResult<Option<(U256, U256, u128, ConstraintSide)>> {
        match side {
            ConstraintSide::Token0 => {
                let liquidity = liquidity_for_amount0(self.sqrt_price, self.sqrt_upper, self.bal0)?;
                let (_, amount1) =
                    amounts_for_liquidity(self.sqrt_price, self.sqrt_lower, self.sqrt_upper, liquidity, true)?;
                Ok((amount1 <= self.bal1).then_some((self.bal0, amount1, liquidity, side)))
            }
            ConstraintSide::Token1 => {
                let liquidity = liquidity_for_amount1(self.sqrt_lower, self.sqrt_price, self.bal1)?;
                let (amount0, _) =
                    amounts_for_liquidity(self.sqrt_price, self.sqrt_lower, self.sqrt_upper, liquidity, true)?;
                Ok((amount0 <= self.bal0).then_some((amount0, self.bal1, liquidity, side)))
            }
        }
    }
}
