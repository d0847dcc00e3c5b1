use async_trait::async_trait;

use crate::domain::execution::{CreatePositionRequest, RemovePositionRequest, SwapRequest};
use crate::shared::errors::ChainError;
use crate::shared::types::{BalancePair, PoolState, PositionId, PositionSnapshot};

/// Transaction hash as reported by the submitter
pub type TxHash = String;

/// Read-only view of the managed pool and wallet
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn pool_state(&self) -> Result<PoolState, ChainError>;

    /// Wallet balances of token0 and token1
    async fn balances(&self) -> Result<BalancePair, ChainError>;

    /// Range of a live position against the pool's current tick
    async fn position_snapshot(&self, id: PositionId) -> Result<PositionSnapshot, ChainError>;
}

/// Submits keeper requests and waits for their outcome
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Mint a position; returns the new position id
    async fn create_position(&self, request: &CreatePositionRequest) -> Result<PositionId, ChainError>;

    async fn remove_position(&self, request: &RemovePositionRequest) -> Result<TxHash, ChainError>;

    async fn swap(&self, request: &SwapRequest) -> Result<TxHash, ChainError>;
}
