//! Token amounts <-> liquidity on the concentrated-liquidity curve

use alloy_primitives::U256;

use super::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use super::tick_math::Q96;
use crate::shared::errors::{KeeperError, KeeperResult};

fn ordered(sqrt_a: U256, sqrt_b: U256) -> (U256, U256) {
    if sqrt_a > sqrt_b {
        (sqrt_b, sqrt_a)
    } else {
        (sqrt_a, sqrt_b)
    }
}

fn to_liquidity(value: U256) -> KeeperResult<u128> {
    u128::try_from(value).map_err(|_| KeeperError::ArithmeticOverflow)
}

/// Amount of token0 spanned by `liquidity` between two sqrt prices:
/// `L * 2^96 * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)`.
pub fn amount0_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128, round_up: bool) -> KeeperResult<U256> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    if sqrt_a.is_zero() {
        return Err(KeeperError::InvalidSqrtPrice(sqrt_a.to_string()));
    }

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = sqrt_b - sqrt_a;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, sqrt_b)?, sqrt_a)
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_b)? / sqrt_a)
    }
}

/// Amount of token1 spanned by `liquidity` between two sqrt prices:
/// `L * (sqrt_b - sqrt_a) / 2^96`.
pub fn amount1_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128, round_up: bool) -> KeeperResult<U256> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    let diff = sqrt_b - sqrt_a;

    if round_up {
        mul_div_rounding_up(U256::from(liquidity), diff, Q96)
    } else {
        mul_div(U256::from(liquidity), diff, Q96)
    }
}

/// Liquidity bought by `amount0` of token0 between two sqrt prices, rounded down.
pub fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> KeeperResult<u128> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    let intermediate = mul_div(sqrt_a, sqrt_b, Q96)?;
    to_liquidity(mul_div(amount0, intermediate, sqrt_b - sqrt_a)?)
}

/// Liquidity bought by `amount1` of token1 between two sqrt prices, rounded down.
pub fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> KeeperResult<u128> {
    let (sqrt_a, sqrt_b) = ordered(sqrt_a, sqrt_b);
    to_liquidity(mul_div(amount1, Q96, sqrt_b - sqrt_a)?)
}

/// Token amounts represented by `liquidity` over `[sqrt_lower, sqrt_upper]` at `sqrt_price`.
///
/// Below the range the position is all token0, above it all token1; at or
/// beyond the upper bound no token0 is owed and at or below the lower bound
/// no token1 is owed.
pub fn amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_lower: U256,
    sqrt_upper: U256,
    liquidity: u128,
    round_up: bool,
) -> KeeperResult<(U256, U256)> {
    let (sqrt_lower, sqrt_upper) = ordered(sqrt_lower, sqrt_upper);

    if sqrt_price <= sqrt_lower {
        Ok((amount0_delta(sqrt_lower, sqrt_upper, liquidity, round_up)?, U256::ZERO))
    } else if sqrt_price < sqrt_upper {
        Ok((
            amount0_delta(sqrt_price, sqrt_upper, liquidity, round_up)?,
            amount1_delta(sqrt_lower, sqrt_price, liquidity, round_up)?,
        ))
    } else {
        Ok((U256::ZERO, amount1_delta(sqrt_lower, sqrt_upper, liquidity, round_up)?))
    }
}
