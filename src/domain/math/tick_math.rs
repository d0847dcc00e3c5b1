//! Tick <-> sqrt price conversion and range snapping

use alloy_primitives::U256;

use crate::shared::errors::{KeeperError, KeeperResult};
use crate::shared::types::TickRange;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// sqrt_price_at_tick(MIN_TICK)
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// sqrt_price_at_tick(MAX_TICK) = 1461446703485210103287273052203988822378723970342
pub const MAX_SQRT_RATIO: U256 =
    U256::from_limbs([0x5d951d5263988d26, 0xefd1fc6a50648849, 0xfffd8963, 0]);

pub const Q96: U256 = U256::from_limbs([0, 1 << 32, 0, 0]);

// sqrt(1.0001^-(2^i)) in Q128, for bits 1..=19 of |tick|
const SQRT_RATIO_BIT_0: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;
const SQRT_RATIO_MULTIPLIERS: [(u32, u128); 19] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x9aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x5d6af8dedb81196699c329225ee604),
    (0x40000, 0x2216e584f5fa1ea926041bedfe98),
    (0x80000, 0x48a170391f7dc42444e8fa2),
];

/// Calculate sqrt(1.0001^tick) * 2^96, rounded up.
///
/// Bit-exact with the on-chain TickMath library: the ratio is accumulated in
/// Q128 from precomputed per-bit multipliers, inverted for positive ticks and
/// then shifted down to Q96.
pub fn sqrt_price_at_tick(tick: i32) -> KeeperResult<U256> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(KeeperError::InvalidTick(tick));
    }

    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(SQRT_RATIO_BIT_0)
    } else {
        U256::from(1u8) << 128
    };

    for (bit, multiplier) in SQRT_RATIO_MULTIPLIERS {
        if abs_tick & bit != 0 {
            ratio = (ratio * U256::from(multiplier)) >> 128;
        }
    }

    // Computed for the negative tick; invert for positive ones
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    let remainder = ratio & U256::from(u32::MAX);
    Ok((ratio >> 32) + U256::from(!remainder.is_zero()))
}

/// Greatest tick whose sqrt price is less than or equal to `sqrt_price_x96`.
pub fn tick_at_sqrt_price(sqrt_price_x96: U256) -> KeeperResult<i32> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(KeeperError::InvalidSqrtPrice(sqrt_price_x96.to_string()));
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if sqrt_price_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

pub fn min_usable_tick(tick_spacing: i32) -> i32 {
    -(MIN_TICK.abs() / tick_spacing) * tick_spacing
}

pub fn max_usable_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

/// Snap `tick` to a range aligned on `tick_spacing`.
///
/// The range is `[floor(tick / s) * s, ceil(tick / s) * s]`. When `tick` is an
/// exact multiple those collapse and the range opens to `[tick - s, tick + s]`
/// so the current price stays strictly inside. `range_width > 1` widens by
/// `(range_width - 1) * s` on each side; the result is clamped to the usable
/// tick domain.
pub fn nearest_usable_tick(tick: i32, tick_spacing: i32, range_width: u32) -> KeeperResult<TickRange> {
    if tick_spacing <= 0 {
        return Err(KeeperError::InvalidTickRange(format!(
            "tick spacing must be positive, got {}",
            tick_spacing
        )));
    }
    if range_width == 0 {
        return Err(KeeperError::InvalidTickRange("range width must be at least 1".to_string()));
    }
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(KeeperError::InvalidTick(tick));
    }

    let spacing = tick_spacing as i64;
    let tick = tick as i64;
    let floor = tick.div_euclid(spacing) * spacing;
    let ceil = if tick.rem_euclid(spacing) == 0 { floor } else { floor + spacing };

    let (lower, upper) = if ceil <= floor {
        (floor - spacing, floor + spacing)
    } else {
        (floor, ceil)
    };

    let widen = (range_width as i64 - 1) * spacing;
    let lower = (lower - widen).max(min_usable_tick(tick_spacing) as i64);
    let upper = (upper + widen).min(max_usable_tick(tick_spacing) as i64);

    // both bounds are inside the i32 tick domain after clamping
    TickRange::new(lower as i32, upper as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sqrt_price_at_tick_zero_is_q96() {
        assert_eq!(sqrt_price_at_tick(0).unwrap(), Q96);
        assert_eq!(Q96, U256::from(79228162514264337593543950336u128));
    }

    #[test]
    fn test_sqrt_price_at_domain_edges() {
        assert_eq!(sqrt_price_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(sqrt_price_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO.to_string(),
            "1461446703485210103287273052203988822378723970342"
        );
    }

    #[test]
    fn test_sqrt_price_rejects_out_of_domain_ticks() {
        assert_eq!(sqrt_price_at_tick(MIN_TICK - 1), Err(KeeperError::InvalidTick(MIN_TICK - 1)));
        assert_eq!(sqrt_price_at_tick(MAX_TICK + 1), Err(KeeperError::InvalidTick(MAX_TICK + 1)));
    }

    #[test]
    fn test_sqrt_price_is_reciprocal_around_zero() {
        // sqrt(p(t)) * sqrt(p(-t)) == 1 up to rounding, i.e. product ~ Q96^2
        let up = sqrt_price_at_tick(60).unwrap();
        let down = sqrt_price_at_tick(-60).unwrap();
        assert!(up > Q96 && down < Q96);
        let product = up * down;
        let q192 = Q96 * Q96;
        let diff = if product > q192 { product - q192 } else { q192 - product };
        assert!(diff < (q192 >> 80));
    }

    #[test]
    fn test_tick_at_sqrt_price_edges() {
        assert_eq!(tick_at_sqrt_price(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(tick_at_sqrt_price(MAX_SQRT_RATIO - U256::from(1u8)).unwrap(), MAX_TICK - 1);
        assert_eq!(tick_at_sqrt_price(Q96).unwrap(), 0);
        assert_eq!(tick_at_sqrt_price(Q96 - U256::from(1u8)).unwrap(), -1);
    }

    #[test]
    fn test_tick_at_sqrt_price_rejects_out_of_domain() {
        assert!(matches!(
            tick_at_sqrt_price(MIN_SQRT_RATIO - U256::from(1u8)),
            Err(KeeperError::InvalidSqrtPrice(_))
        ));
        assert!(matches!(
            tick_at_sqrt_price(MAX_SQRT_RATIO),
            Err(KeeperError::InvalidSqrtPrice(_))
        ));
    }

    #[test]
    fn test_nearest_usable_tick_exact_multiple_opens_symmetrically() {
        let range = nearest_usable_tick(0, 60, 1).unwrap();
        assert_eq!((range.lower, range.upper), (-60, 60));

        let range = nearest_usable_tick(120, 60, 1).unwrap();
        assert_eq!((range.lower, range.upper), (60, 180));
    }

    #[test]
    fn test_nearest_usable_tick_between_multiples() {
        let range = nearest_usable_tick(30, 60, 1).unwrap();
        assert_eq!((range.lower, range.upper), (0, 60));

        let range = nearest_usable_tick(-30, 60, 1).unwrap();
        assert_eq!((range.lower, range.upper), (-60, 0));

        let range = nearest_usable_tick(-61, 60, 1).unwrap();
        assert_eq!((range.lower, range.upper), (-120, -60));
    }

    #[test]
    fn test_nearest_usable_tick_widens() {
        let range = nearest_usable_tick(0, 60, 5).unwrap();
        assert_eq!((range.lower, range.upper), (-300, 300));

        let range = nearest_usable_tick(30, 60, 2).unwrap();
        assert_eq!((range.lower, range.upper), (-60, 120));
    }

    #[test]
    fn test_nearest_usable_tick_clamps_to_domain() {
        let range = nearest_usable_tick(MAX_TICK - 10, 60, 3).unwrap();
        assert_eq!(range.upper, max_usable_tick(60));
        assert!(range.lower < range.upper);

        let range = nearest_usable_tick(0, 200, u32::MAX).unwrap();
        assert_eq!((range.lower, range.upper), (min_usable_tick(200), max_usable_tick(200)));
    }

    #[test]
    fn test_nearest_usable_tick_rejects_bad_inputs() {
        assert!(matches!(nearest_usable_tick(0, 0, 1), Err(KeeperError::InvalidTickRange(_))));
        assert!(matches!(nearest_usable_tick(0, -10, 1), Err(KeeperError::InvalidTickRange(_))));
        assert!(matches!(nearest_usable_tick(0, 60, 0), Err(KeeperError::InvalidTickRange(_))));
        assert_eq!(nearest_usable_tick(MAX_TICK + 1, 60, 1), Err(KeeperError::InvalidTick(MAX_TICK + 1)));
    }

    #[test]
    fn test_usable_tick_bounds() {
        assert_eq!(min_usable_tick(60), -887220);
        assert_eq!(max_usable_tick(60), 887220);
        assert_eq!(max_usable_tick(1), MAX_TICK);
    }

    proptest! {
        #[test]
        fn prop_tick_round_trip(tick in MIN_TICK..MAX_TICK) {
            let sqrt_price = sqrt_price_at_tick(tick).unwrap();
            let recovered = tick_at_sqrt_price(sqrt_price).unwrap();
            prop_assert!((recovered - tick).abs() <= 1);
            prop_assert_eq!(recovered, tick);
        }

        #[test]
        fn prop_sqrt_price_strictly_increasing(tick in MIN_TICK..MAX_TICK) {
            prop_assert!(sqrt_price_at_tick(tick).unwrap() < sqrt_price_at_tick(tick + 1).unwrap());
        }

        #[test]
        fn prop_nearest_usable_tick_is_aligned_and_ordered(
            tick in -800_000i32..800_000,
            spacing in prop::sample::select(vec![1i32, 10, 60, 200]),
            width in 1u32..20,
        ) {
            let range = nearest_usable_tick(tick, spacing, width).unwrap();
            prop_assert!(range.lower < range.upper);
            prop_assert!(range.is_aligned(spacing));
            prop_assert!(range.lower <= tick && tick <= range.upper);
        }
    }
}
