//! Chain reader backed by a JSON snapshot file, re-read on every call

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dry_run::PaperLedger;
use super::dto::{RawBalances, RawPoolState, RawPosition};
use super::traits::ChainReader;
use crate::shared::errors::ChainError;
use crate::shared::types::{BalancePair, PoolState, PositionId, PositionSnapshot};

/// On-disk layout; `positions` is keyed by decimal position id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub pool: RawPoolState,
    pub balances: RawBalances,
    #[serde(default)]
    pub positions: BTreeMap<String, RawPosition>,
}

pub struct SnapshotFileReader {
    path: PathBuf,
    paper: Option<PaperLedger>,
}

impl SnapshotFileReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            paper: None,
        }
    }

    /// Also answer for positions opened by a dry-run submitter
    pub fn with_paper_positions(mut self, ledger: PaperLedger) -> Self {
        self.paper = Some(ledger);
        self
    }

    async fn load(&self) -> Result<SnapshotFile, ChainError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ChainError::ReadFailed(format!("{}: {}", self.path.display(), e)))?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl ChainReader for SnapshotFileReader {
    async fn pool_state(&self) -> Result<PoolState, ChainError> {
        let snapshot = self.load().await?;
        PoolState::try_from(snapshot.pool)
    }

    async fn balances(&self) -> Result<BalancePair, ChainError> {
        let snapshot = self.load().await?;
        BalancePair::try_from(snapshot.balances)
    }

    async fn position_snapshot(&self, id: PositionId) -> Result<PositionSnapshot, ChainError> {
        let mut snapshot = self.load().await?;
        let current_tick = snapshot.pool.tick;

        if let Some(raw) = snapshot.positions.remove(&id.0.to_string()) {
            return raw.into_snapshot(current_tick);
        }

        if let Some(ledger) = &self.paper {
            if let Some(range) = ledger.get(id).await {
                debug!("Position {} served from the paper ledger", id);
                let raw = RawPosition {
                    tick_lower: range.lower,
                    tick_upper: range.upper,
                    liquidity: None,
                };
                return raw.into_snapshot(current_tick);
            }
        }

        Err(ChainError::PositionNotFound(id.to_string()))
    }
}
