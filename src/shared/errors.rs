//! Error handling for the application

use thiserror::Error;

/// Errors raised by the price/liquidity core and the allocation policy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeeperError {
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Pool price sits exactly on the range boundary (tick {0})")]
    PriceAtRangeBoundary(i32),

    #[error("Tick {0} is outside the valid tick domain")]
    InvalidTick(i32),

    #[error("sqrt price {0} is outside the valid sqrt price domain")]
    InvalidSqrtPrice(String),

    #[error("Invalid tick range: {0}")]
    InvalidTickRange(String),

    #[error("USD price unavailable for {0}")]
    PriceUnavailable(String),

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Stale pool data: {0}")]
    StalePoolData(String),
}

/// Collaborator (chain, price feed, submitter) errors
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error(transparent)]
    Keeper(#[from] KeeperError),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Chain error: {0}")]
    ChainError(String),

    #[error("Keeper error: {0}")]
    KeeperError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<KeeperError> for AppError {
    fn from(err: KeeperError) -> Self {
        AppError::KeeperError(err.to_string())
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        AppError::ChainError(err.to_string())
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        ChainError::NetworkError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::InvalidPayload(err.to_string())
    }
}

pub type KeeperResult<T> = Result<T, KeeperError>;
