//! Domain layer - core business logic and entities

pub mod execution;
pub mod math;
pub mod position;
pub mod rebalance;
