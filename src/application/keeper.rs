//! Keeper loop: monitor tracked positions, rebalance the wallet, open a
//! position when none is tracked

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::execution::RequestBuilder;
use crate::domain::position::{HealthState, HealthVerdict, PositionHealth, PositionHealthMonitor, PositionSizer};
use crate::domain::rebalance::{RebalanceAction, RebalanceDecider};
use crate::infrastructure::chain::{ChainReader, TransactionSubmitter};
use crate::infrastructure::price::PriceSource;
use crate::shared::errors::ChainError;
use crate::shared::types::{PositionId, Token};
use crate::shared::utils::{format_amount, generate_id};

/// Everything the keeper remembers between cycles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeeperState {
    pub positions: BTreeMap<PositionId, PositionHealth>,
    pub in_flight: bool,
    pub cycles: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Monitor,
    Remove,
    Rebalance,
    Create,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageError {
    pub stage: CycleStage,
    pub message: String,
}

/// What one cycle did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub cycle_id: String,
    pub skipped: bool,
    pub verdicts: Vec<(PositionId, HealthVerdict)>,
    pub removed: Vec<PositionId>,
    pub swap: Option<RebalanceAction>,
    pub created: Option<PositionId>,
    pub errors: Vec<StageError>,
}

impl CycleReport {
    fn record(&mut self, stage: CycleStage, err: impl std::fmt::Display) {
        let message = err.to_string();
        error!("❌ {:?} stage failed: {}", stage, message);
        self.errors.push(StageError { stage, message });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub struct Keeper {
    reader: Arc<dyn ChainReader>,
    prices: Arc<dyn PriceSource>,
    submitter: Arc<dyn TransactionSubmitter>,
    sizer: PositionSizer,
    monitor: PositionHealthMonitor,
    decider: RebalanceDecider,
    requests: RequestBuilder,
    interval: Duration,
}

impl Keeper {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Arc<dyn ChainReader>,
        prices: Arc<dyn PriceSource>,
        submitter: Arc<dyn TransactionSubmitter>,
        sizer: PositionSizer,
        monitor: PositionHealthMonitor,
        decider: RebalanceDecider,
        requests: RequestBuilder,
        interval: Duration,
    ) -> Self {
        Self {
            reader,
            prices,
            submitter,
            sizer,
            monitor,
            decider,
            requests,
            interval,
        }
    }

    /// Run cycles on the interval until `shutdown` flips to true.
    /// A cycle in progress always completes before the loop exits.
    pub async fn run(&self, mut state: KeeperState, mut shutdown: watch::Receiver<bool>) -> KeeperState {
        info!("🚀 Keeper started, cycle every {:?}", self.interval);

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let (next, report) = self.run_cycle(state).await;
                    state = next;
                    if report.has_errors() {
                        warn!("⚠️ Cycle {} finished with {} error(s)", report.cycle_id, report.errors.len());
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("🛑 Keeper stopped after {} cycle(s), tracking {} position(s)", state.cycles, state.positions.len());
        state
    }

    /// One monitoring cycle. Skipped entirely while another is in flight.
    pub async fn run_cycle(&self, mut state: KeeperState) -> (KeeperState, CycleReport) {
        let cycle_id = generate_id();
        if state.in_flight {
            warn!("⏭️ Previous cycle still running, skipping {}", cycle_id);
            let report = CycleReport {
                cycle_id,
                skipped: true,
                ..Default::default()
            };
            return (state, report);
        }

        state.in_flight = true;
        state.cycles += 1;
        let span = info_span!("cycle", id = %cycle_id, n = state.cycles);

        let mut report = CycleReport {
            cycle_id,
            ..Default::default()
        };
        self.execute(&mut state.positions, &mut report).instrument(span).await;

        state.in_flight = false;
        (state, report)
    }

    async fn execute(&self, positions: &mut BTreeMap<PositionId, PositionHealth>, report: &mut CycleReport) {
        info!("🔍 Checking {} tracked position(s)", positions.len());

        self.monitor_positions(positions, report).await;
        self.rebalance(report).await;

        if positions.is_empty() {
            match self.open_position(report).await {
                Ok((id, health)) => {
                    positions.insert(id, health);
                }
                Err(e) => report.record(CycleStage::Create, e),
            }
        }
    }

    async fn monitor_positions(&self, positions: &mut BTreeMap<PositionId, PositionHealth>, report: &mut CycleReport) {
        let ids: Vec<PositionId> = positions.keys().copied().collect();

        for id in ids {
            let Some(health) = positions.get_mut(&id) else {
                continue;
            };

            // A closed entry is a removal that failed earlier; retry it without re-counting
            if health.state != HealthState::Closed {
                let snapshot = match self.reader.position_snapshot(id).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        report.record(CycleStage::Monitor, format!("position {}: {}", id, e));
                        continue;
                    }
                };
                let verdict = self.monitor.observe(id, health, &snapshot);
                report.verdicts.push((id, verdict));
                if !verdict.is_removal() {
                    continue;
                }
            }

            let request = self.requests.remove_position(id, Utc::now());
            match self.submitter.remove_position(&request).await {
                Ok(tx) => {
                    info!("🗑️ Removed position {} (tx {})", id, tx);
                    positions.remove(&id);
                    report.removed.push(id);
                }
                Err(e) => report.record(CycleStage::Remove, format!("position {}: {}", id, e)),
            }
        }
    }

    async fn price_or_none(&self, token: &Token) -> Option<f64> {
        match self.prices.price_usd(token).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!("⚠️ No USD price for {}: {}", token.symbol, e);
                None
            }
        }
    }

    async fn rebalance(&self, report: &mut CycleReport) {
        let balances = match self.reader.balances().await {
            Ok(balances) => balances,
            Err(e) => return report.record(CycleStage::Rebalance, e),
        };
        let price0 = self.price_or_none(self.requests.token0()).await;
        let price1 = self.price_or_none(self.requests.token1()).await;

        let action = match self.decider.evaluate(&balances, price0, price1) {
            Ok(Some(action)) => action,
            Ok(None) => return,
            Err(e) => return report.record(CycleStage::Rebalance, e),
        };

        let request = self.requests.swap(&action, Utc::now());
        match self.submitter.swap(&request).await {
            Ok(tx) => {
                info!("🔄 Swap submitted (tx {})", tx);
                report.swap = Some(action);
            }
            Err(e) => report.record(CycleStage::Rebalance, e),
        }
    }

    async fn open_position(&self, report: &mut CycleReport) -> Result<(PositionId, PositionHealth), ChainError> {
        let pool = self.reader.pool_state().await?;
        let balances = self.reader.balances().await?;
        let sizing = self.sizer.size(&pool, &balances)?;

        info!(
            "📐 Sized position {}: {} {} / {} {} ({:?} binds)",
            sizing.range(),
            format_amount(sizing.amount0, balances.decimals0),
            self.requests.token0().symbol,
            format_amount(sizing.amount1, balances.decimals1),
            self.requests.token1().symbol,
            sizing.constraint
        );

        let request = self.requests.create_position(&sizing, Utc::now())?;
        let id = self.submitter.create_position(&request).await?;
        info!("✅ Opened position {} in {}", id, sizing.range());

        report.created = Some(id);
        Ok((id, PositionHealth::new(sizing.range())))
    }
}
