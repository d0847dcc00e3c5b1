//! Paper-trading submitter: logs every request and fakes the outcome

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::traits::{TransactionSubmitter, TxHash};
use crate::domain::execution::{CreatePositionRequest, RemovePositionRequest, SwapRequest};
use crate::shared::errors::ChainError;
use crate::shared::types::{PositionId, TickRange};
use crate::shared::utils::generate_id;

/// Positions opened by the dry-run submitter, shared with the snapshot reader
/// so paper positions can be monitored like real ones
#[derive(Debug, Clone)]
pub struct PaperLedger {
    positions: Arc<Mutex<BTreeMap<PositionId, TickRange>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for PaperLedger {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PaperLedger {
    pub fn new(first_id: u64) -> Self {
        Self {
            positions: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(first_id)),
        }
    }

    pub async fn open(&self, range: TickRange) -> PositionId {
        let id = PositionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.positions.lock().await.insert(id, range);
        id
    }

    /// Returns whether the position was open
    pub async fn close(&self, id: PositionId) -> bool {
        self.positions.lock().await.remove(&id).is_some()
    }

    pub async fn get(&self, id: PositionId) -> Option<TickRange> {
        self.positions.lock().await.get(&id).copied()
    }

    pub async fn len(&self) -> usize {
        self.positions.lock().await.len()
    }
}

pub struct DryRunSubmitter {
    ledger: PaperLedger,
}

impl DryRunSubmitter {
    pub fn new(ledger: PaperLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &PaperLedger {
        &self.ledger
    }
}

fn synthetic_hash() -> TxHash {
    format!("dry-run-{}", generate_id())
}

#[async_trait]
impl TransactionSubmitter for DryRunSubmitter {
    async fn create_position(&self, request: &CreatePositionRequest) -> Result<PositionId, ChainError> {
        let range = TickRange::new(request.tick_lower, request.tick_upper)?;
        let id = self.ledger.open(range).await;
        info!(
            "🧪 [dry-run] Mint {} in {}: amount0 {} (min {}), amount1 {} (min {}), deadline {}",
            id,
            range,
            request.amount0,
            request.amount0_min,
            request.amount1,
            request.amount1_min,
            request.deadline
        );
        Ok(id)
    }

    async fn remove_position(&self, request: &RemovePositionRequest) -> Result<TxHash, ChainError> {
        let was_paper = self.ledger.close(request.position_id).await;
        info!(
            "🧪 [dry-run] Remove {} (paper position: {}), deadline {}",
            request.position_id, was_paper, request.deadline
        );
        Ok(synthetic_hash())
    }

    async fn swap(&self, request: &SwapRequest) -> Result<TxHash, ChainError> {
        info!(
            "🧪 [dry-run] Swap {} of {} -> {} (slippage {:.2}%), deadline {}",
            request.amount_in,
            request.token_in,
            request.token_out,
            request.slippage_tolerance * 100.0,
            request.deadline
        );
        Ok(synthetic_hash())
    }
}
