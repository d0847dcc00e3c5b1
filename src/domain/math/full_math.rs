//! Multiply-then-divide with a 512-bit intermediate product

use alloy_primitives::{U256, U512};

use crate::shared::errors::{KeeperError, KeeperResult};

/// Narrow a 512-bit quotient back to 256 bits
fn narrow(value: U512) -> KeeperResult<U256> {
    let limbs = value.into_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return Err(KeeperError::ArithmeticOverflow);
    }
    Ok(U256::from_limbs_slice(&limbs[..4]))
}

/// Computes `floor(a * b / denominator)`.
///
/// The product is formed in 512 bits so it never overflows; only a quotient
/// wider than 256 bits fails with `ArithmeticOverflow`.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> KeeperResult<U256> {
    if denominator.is_zero() {
        return Err(KeeperError::DivisionByZero);
    }

    // fast path when the product fits in 256 bits
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }

    narrow((U512::from(a) * U512::from(b)) / U512::from(denominator))
}

/// Computes `ceil(a * b / denominator)`.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> KeeperResult<U256> {
    if denominator.is_zero() {
        return Err(KeeperError::DivisionByZero);
    }

    if let Some(product) = a.checked_mul(b) {
        let (quotient, remainder) = (product / denominator, product % denominator);
        return quotient
            .checked_add(U256::from(!remainder.is_zero()))
            .ok_or(KeeperError::ArithmeticOverflow);
    }

    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    let (quotient, remainder) = (product / denominator, product % denominator);

    narrow(quotient)?
        .checked_add(U256::from(!remainder.is_zero()))
        .ok_or(KeeperError::ArithmeticOverflow)
}

/// Computes `ceil(a / b)`.
pub fn div_rounding_up(a: U256, b: U256) -> KeeperResult<U256> {
    if b.is_zero() {
        return Err(KeeperError::DivisionByZero);
    }
    let (quotient, remainder) = (a / b, a % b);
    Ok(quotient + U256::from(!remainder.is_zero()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_mul_div_basic() {
        assert_eq!(mul_div(u(10), u(20), u(5)).unwrap(), u(40));
        assert_eq!(mul_div(u(0), u(100), u(50)).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_mul_div_rounds_down() {
        assert_eq!(mul_div(u(1), u(1), u(2)).unwrap(), U256::ZERO);
        assert_eq!(mul_div(u(3), u(1), u(2)).unwrap(), u(1));
        assert_eq!(mul_div(u(5), u(1), u(3)).unwrap(), u(1));
    }

    #[test]
    fn test_mul_div_rounding_up_with_remainder() {
        assert_eq!(mul_div_rounding_up(u(10), u(3), u(7)).unwrap(), u(5));
        assert_eq!(mul_div_rounding_up(u(1), u(1), u(3)).unwrap(), u(1));
        assert_eq!(mul_div_rounding_up(u(10), u(20), u(5)).unwrap(), u(40));
    }

    #[test]
    fn test_phantom_overflow_is_handled() {
        // MAX * MAX / MAX only fits thanks to the 512-bit intermediate
        assert_eq!(mul_div(U256::MAX, U256::MAX, U256::MAX).unwrap(), U256::MAX);
        assert_eq!(
            mul_div_rounding_up(U256::MAX, U256::MAX, U256::MAX).unwrap(),
            U256::MAX
        );

        let q128 = U256::from(1u8) << 128;
        let a = q128 * u(3);
        let b = q128 * u(2);
        assert_eq!(mul_div(a, b, q128).unwrap(), q128 * u(6));
    }

    #[test]
    fn test_overflowing_quotient_fails() {
        assert_eq!(
            mul_div(U256::MAX, U256::MAX, u(1)),
            Err(KeeperError::ArithmeticOverflow)
        );
        assert_eq!(
            mul_div_rounding_up(U256::MAX, u(2), u(1)),
            Err(KeeperError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_rounding_up_exact_quotient_near_max() {
        // divides evenly, so nothing is added
        assert_eq!(
            mul_div_rounding_up(U256::MAX, U256::MAX - u(1), U256::MAX).unwrap(),
            U256::MAX - u(1)
        );
    }

    #[test]
    fn test_zero_denominator() {
        assert_eq!(mul_div(u(1), u(1), U256::ZERO), Err(KeeperError::DivisionByZero));
        assert_eq!(
            mul_div_rounding_up(u(1), u(1), U256::ZERO),
            Err(KeeperError::DivisionByZero)
        );
        assert_eq!(div_rounding_up(u(1), U256::ZERO), Err(KeeperError::DivisionByZero));
    }

    #[test]
    fn test_div_rounding_up() {
        assert_eq!(div_rounding_up(u(9), u(3)).unwrap(), u(3));
        assert_eq!(div_rounding_up(u(10), u(3)).unwrap(), u(4));
        assert_eq!(div_rounding_up(u(0), u(5)).unwrap(), U256::ZERO);
    }

    proptest! {
        #[test]
        fn prop_round_up_is_floor_or_floor_plus_one(
            a in any::<u128>(),
            b in any::<u128>(),
            d in 1u128..,
        ) {
            let down = mul_div(u(a), u(b), u(d)).unwrap();
            let up = mul_div_rounding_up(u(a), u(b), u(d)).unwrap();
            prop_assert!(up == down || up == down + u(1));
        }

        #[test]
        fn prop_mul_then_div_by_same_factor_is_identity(a in any::<u128>(), b in 1u128..) {
            let wide_a = u(a) << 100;
            prop_assert_eq!(mul_div(wide_a, u(b), u(b)).unwrap(), wide_a);
            prop_assert_eq!(mul_div_rounding_up(wide_a, u(b), u(b)).unwrap(), wide_a);
        }
    }
}
