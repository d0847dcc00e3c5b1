//! Rangekeeper - concentrated-liquidity position keeper
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{Keeper, KeeperState};
pub use domain::position::{PositionHealthMonitor, PositionSizer};
pub use domain::rebalance::RebalanceDecider;
pub use shared::config::{Config, ConfigLoader, KeeperConfig};
