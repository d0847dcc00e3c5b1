//! Chain-side collaborators: state readers and transaction submission

pub mod dry_run;
pub mod dto;
pub mod snapshot_file;
pub mod traits;

pub use dry_run::{DryRunSubmitter, PaperLedger};
pub use dto::{RawBalances, RawPoolState, RawPosition};
pub use snapshot_file::SnapshotFileReader;
pub use traits::{ChainReader, TransactionSubmitter, TxHash};
