//! USD allocation policy: top up an underweight token with one swap

use tracing::{debug, info};

use super::{PortfolioSnapshot, RebalanceAction, SwapDirection};
use crate::shared::config::KeeperConfig;
use crate::shared::errors::{KeeperError, KeeperResult};
use crate::shared::types::BalancePair;
use crate::shared::utils::{from_ui_amount, to_ui_amount};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalancePolicy {
    pub rebalance_threshold: f64,
    pub target_allocation_fraction: f64,
}

impl From<&KeeperConfig> for RebalancePolicy {
    fn from(cfg: &KeeperConfig) -> Self {
        Self {
            rebalance_threshold: cfg.rebalance_threshold,
            target_allocation_fraction: cfg.target_allocation_fraction,
        }
    }
}

fn usable_price(price: Option<f64>, token: &str) -> KeeperResult<f64> {
    match price {
        Some(p) if p.is_finite() && p > 0.0 => Ok(p),
        _ => Err(KeeperError::PriceUnavailable(token.to_string())),
    }
}

impl PortfolioSnapshot {
    /// Value both holdings in USD. Fails when either price is missing or unusable.
    pub fn compute(balances: &BalancePair, price0_usd: Option<f64>, price1_usd: Option<f64>) -> KeeperResult<Self> {
        let price0_usd = usable_price(price0_usd, "token0")?;
        let price1_usd = usable_price(price1_usd, "token1")?;

        let value0_usd = to_ui_amount(balances.raw0, balances.decimals0) * price0_usd;
        let value1_usd = to_ui_amount(balances.raw1, balances.decimals1) * price1_usd;
        let total_usd = value0_usd + value1_usd;

        let (ratio0, ratio1) = if total_usd > 0.0 {
            (value0_usd / total_usd, value1_usd / total_usd)
        } else {
            (0.0, 0.0)
        };

        Ok(Self {
            price0_usd,
            price1_usd,
            value0_usd,
            value1_usd,
            total_usd,
            ratio0,
            ratio1,
        })
    }
}

/// Stateless: every evaluation starts from fresh balances and prices, and
/// nothing damps repeated triggers between cycles.
pub struct RebalanceDecider {
    policy: RebalancePolicy,
}

impl RebalanceDecider {
    pub fn new(policy: RebalancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RebalancePolicy {
        &self.policy
    }

    /// Emit at most one swap that brings an underweight token up to the target share
    pub fn evaluate(
        &self,
        balances: &BalancePair,
        price0_usd: Option<f64>,
        price1_usd: Option<f64>,
    ) -> KeeperResult<Option<RebalanceAction>> {
        let snapshot = PortfolioSnapshot::compute(balances, price0_usd, price1_usd)?;
        self.decide(&snapshot, balances)
    }

    pub fn decide(&self, snapshot: &PortfolioSnapshot, balances: &BalancePair) -> KeeperResult<Option<RebalanceAction>> {
        debug!(
            "Portfolio: ${:.2} token0 ({:.2}%) / ${:.2} token1 ({:.2}%)",
            snapshot.value0_usd,
            snapshot.ratio0 * 100.0,
            snapshot.value1_usd,
            snapshot.ratio1 * 100.0
        );

        if snapshot.total_usd <= 0.0 {
            return Ok(None);
        }

        let target_usd = self.policy.target_allocation_fraction * snapshot.total_usd;

        let (direction, amount_in_usd, sell_price, sell_decimals) = if snapshot.ratio0 <= self.policy.rebalance_threshold {
            (
                SwapDirection::Token1ForToken0,
                target_usd - snapshot.value0_usd,
                snapshot.price1_usd,
                balances.decimals1,
            )
        } else if snapshot.ratio1 <= self.policy.rebalance_threshold {
            (
                SwapDirection::Token0ForToken1,
                target_usd - snapshot.value1_usd,
                snapshot.price0_usd,
                balances.decimals0,
            )
        } else {
            return Ok(None);
        };

        let amount_in = from_ui_amount(amount_in_usd / sell_price, sell_decimals);
        if amount_in.is_zero() {
            return Ok(None);
        }

        info!(
            "⚖️ Rebalance: {:?} for ${:.2} (token0 {:.2}%, token1 {:.2}%, threshold {:.2}%)",
            direction,
            amount_in_usd,
            snapshot.ratio0 * 100.0,
            snapshot.ratio1 * 100.0,
            self.policy.rebalance_threshold * 100.0
        );

        Ok(Some(RebalanceAction {
            direction,
            amount_in,
            amount_in_usd,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use crate::shared::utils::to_ui_amount;

    fn decider() -> RebalanceDecider {
        RebalanceDecider::new(RebalancePolicy {
            rebalance_threshold: 0.10,
            target_allocation_fraction: 0.30,
        })
    }

    fn balances(ui0: f64, ui1: f64) -> BalancePair {
        BalancePair {
            raw0: from_ui_amount(ui0, 6),
            raw1: from_ui_amount(ui1, 18),
            decimals0: 6,
            decimals1: 18,
        }
    }

    #[test]
    fn test_ratios_sum_to_one() {
        for (ui0, ui1, p0, p1) in [(1.0, 1.0, 1.0, 1.0), (1234.5, 0.75, 1.0, 3100.0), (0.001, 9e6, 65000.0, 0.002)] {
            let snapshot = PortfolioSnapshot::compute(&balances(ui0, ui1), Some(p0), Some(p1)).unwrap();
            assert!((snapshot.ratio0 + snapshot.ratio1 - 1.0).abs() < 1e-12);
            assert!((snapshot.total_usd - snapshot.value0_usd - snapshot.value1_usd).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_price_is_unavailable() {
        let err = decider().evaluate(&balances(1.0, 1.0), None, Some(1.0)).unwrap_err();
        assert_eq!(err, KeeperError::PriceUnavailable("token0".to_string()));

        let err = decider().evaluate(&balances(1.0, 1.0), Some(1.0), Some(f64::NAN)).unwrap_err();
        assert_eq!(err, KeeperError::PriceUnavailable("token1".to_string()));

        let err = decider().evaluate(&balances(1.0, 1.0), Some(0.0), Some(1.0)).unwrap_err();
        assert_eq!(err, KeeperError::PriceUnavailable("token0".to_string()));
    }

    #[test]
    fn test_underweight_token0_bought_up_to_target() {
        // token0: $5, token1: $95 at $2000 -> ratio0 = 0.05
        let bals = balances(5.0, 95.0 / 2000.0);
        let action = decider().evaluate(&bals, Some(1.0), Some(2000.0)).unwrap().unwrap();

        assert_eq!(action.direction, SwapDirection::Token1ForToken0);
        assert!((action.amount_in_usd - 25.0).abs() < 1e-9);

        // selling that much token1 leaves token0 holding exactly 30% of the portfolio
        let sold_token1 = to_ui_amount(action.amount_in, 18);
        assert!((sold_token1 - 25.0 / 2000.0).abs() < 1e-12);
        let value0_after = 5.0 + sold_token1 * 2000.0;
        assert!((value0_after / 100.0 - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_underweight_token1_sells_token0() {
        // token0: $92, token1: $8
        let bals = balances(92.0, 8.0);
        let action = decider().evaluate(&bals, Some(1.0), Some(1.0)).unwrap().unwrap();

        assert_eq!(action.direction, SwapDirection::Token0ForToken1);
        assert!((action.amount_in_usd - 22.0).abs() < 1e-9);
        assert_eq!(action.amount_in, U256::from(22_000_000u64));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let action = decider().evaluate(&balances(10.0, 90.0), Some(1.0), Some(1.0)).unwrap();
        assert_eq!(action.map(|a| a.direction), Some(SwapDirection::Token1ForToken0));
    }

    #[test]
    fn test_balanced_portfolio_emits_nothing() {
        assert_eq!(decider().evaluate(&balances(40.0, 60.0), Some(1.0), Some(1.0)).unwrap(), None);
        assert_eq!(decider().evaluate(&balances(11.0, 89.0), Some(1.0), Some(1.0)).unwrap(), None);
    }

    #[test]
    fn test_empty_wallet_emits_nothing() {
        assert_eq!(decider().evaluate(&balances(0.0, 0.0), Some(1.0), Some(1.0)).unwrap(), None);
    }

    #[test]
    fn test_repeated_evaluations_trigger_again() {
        // no cooldown between evaluations
        let decider = decider();
        let bals = balances(5.0, 95.0);
        assert!(decider.evaluate(&bals, Some(1.0), Some(1.0)).unwrap().is_some());
        assert!(decider.evaluate(&bals, Some(1.0), Some(1.0)).unwrap().is_some());
    }
}
