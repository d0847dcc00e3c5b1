mod app;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rangekeeper::ConfigLoader;

#[derive(Parser, Debug)]
#[command(version, about = "Concentrated-liquidity position keeper")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "Config.toml")]
    config: String,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Log requests instead of submitting them
    #[arg(long)]
    dry_run: bool,

    /// Minutes between cycles (overrides config)
    #[arg(long)]
    interval_minutes: Option<u64>,

    /// Consecutive out-of-range cycles before removal (overrides config)
    #[arg(long)]
    out_of_range_threshold: Option<u32>,

    /// Token share that triggers a rebalance (overrides config)
    #[arg(long)]
    rebalance_threshold: Option<f64>,

    /// Slippage tolerance in basis points (overrides config)
    #[arg(long)]
    slippage_bps: Option<u32>,

    /// Path to the chain snapshot JSON (overrides config)
    #[arg(long)]
    snapshot: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let base_config = ConfigLoader::load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    // Priority: CLI args > Config file > Defaults
    let mut app_cfg = app::AppCfg::from_config(base_config, args.dry_run, args.once);

    if let Some(minutes) = args.interval_minutes {
        app_cfg.keeper.monitoring_interval_minutes = minutes;
    }
    if let Some(threshold) = args.out_of_range_threshold {
        app_cfg.keeper.out_of_range_threshold = threshold;
    }
    if let Some(threshold) = args.rebalance_threshold {
        app_cfg.keeper.rebalance_threshold = threshold;
    }
    if let Some(slippage_bps) = args.slippage_bps {
        app_cfg.keeper.slippage_bps = slippage_bps;
    }
    if let Some(snapshot) = args.snapshot {
        app_cfg.snapshot_path = snapshot;
    }
    app_cfg.keeper.validate()?;

    app::run(app_cfg).await
}
