// src/app.rs
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::watch;
use tracing::{error, info, warn};

use rangekeeper::application::{Keeper, KeeperState};
use rangekeeper::domain::execution::RequestBuilder;
use rangekeeper::domain::position::{PositionHealthMonitor, PositionSizer, SizerConfig};
use rangekeeper::domain::rebalance::{RebalanceDecider, RebalancePolicy};
use rangekeeper::infrastructure::{DryRunSubmitter, HttpPriceSource, PaperLedger, SnapshotFileReader};
use rangekeeper::shared::config::{Config, KeeperConfig, PriceFeedCfg};
use rangekeeper::shared::types::Token;

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub dry_run: bool,
    pub once: bool,
    pub keeper: KeeperConfig,
    pub pool_address: String,
    pub fee: u32,
    pub token0: Token,
    pub token1: Token,
    pub price_feed: PriceFeedCfg,
    pub snapshot_path: String,
}

impl AppCfg {
    pub fn from_config(cfg: Config, dry_run: bool, once: bool) -> Self {
        Self {
            dry_run,
            once,
            keeper: cfg.keeper,
            pool_address: cfg.pool.address.to_string(),
            fee: cfg.pool.fee,
            token0: cfg.tokens.token0,
            token1: cfg.tokens.token1,
            price_feed: cfg.price_feed,
            snapshot_path: cfg.snapshot.path,
        }
    }
}

pub async fn run(app_cfg: AppCfg) -> Result<()> {
    info!("Starting range keeper");
    info!("Configuration: {:?}", app_cfg);

    if !app_cfg.dry_run {
        error!("❌ No live transaction submitter is available in this build");
        return Err(anyhow!("live submission is not supported; rerun with --dry-run"));
    }

    info!(
        "✅ Pool {} ({} / {}, fee {})",
        app_cfg.pool_address, app_cfg.token0.symbol, app_cfg.token1.symbol, app_cfg.fee
    );

    let ledger = PaperLedger::default();
    let reader = SnapshotFileReader::new(&app_cfg.snapshot_path).with_paper_positions(ledger.clone());
    let submitter = DryRunSubmitter::new(ledger);
    let prices = HttpPriceSource::new(&app_cfg.price_feed)?;

    let keeper = Keeper::new(
        Arc::new(reader),
        Arc::new(prices),
        Arc::new(submitter),
        PositionSizer::new(SizerConfig::from(&app_cfg.keeper)),
        PositionHealthMonitor::new(app_cfg.keeper.out_of_range_threshold),
        RebalanceDecider::new(RebalancePolicy::from(&app_cfg.keeper)),
        RequestBuilder::new(app_cfg.token0.clone(), app_cfg.token1.clone(), app_cfg.fee, &app_cfg.keeper),
        app_cfg.keeper.monitoring_interval(),
    );

    if app_cfg.once {
        let (_, report) = keeper.run_cycle(KeeperState::default()).await;
        info!("Single cycle report: {:?}", report);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, finishing current cycle");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                // dropping the sender would stop the loop
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    let state = keeper.run(KeeperState::default(), shutdown_rx).await;
    info!("Final state: {} position(s) tracked after {} cycle(s)", state.positions.len(), state.cycles);
    Ok(())
}
