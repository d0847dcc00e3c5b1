//! Infrastructure layer - chain, price feed and submission collaborators

pub mod chain;
pub mod price;

pub use chain::{ChainReader, DryRunSubmitter, PaperLedger, SnapshotFileReader, TransactionSubmitter};
pub use price::{HttpPriceSource, PriceSource};
