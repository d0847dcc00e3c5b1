//! Application layer - the keeper loop

pub mod keeper;

pub use keeper::{CycleReport, CycleStage, Keeper, KeeperState, StageError};
