//! Fixed-point price and liquidity math. No floating point below this line.

pub mod full_math;
pub mod liquidity_math;
pub mod tick_math;

pub use full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
pub use liquidity_math::{
    amount0_delta, amount1_delta, amounts_for_liquidity, liquidity_for_amount0, liquidity_for_amount1,
};
pub use tick_math::{
    nearest_usable_tick, sqrt_price_at_tick, tick_at_sqrt_price, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK, Q96,
};
