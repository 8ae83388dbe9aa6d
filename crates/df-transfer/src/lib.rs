//! Resource matching and per-tick flow balancing across a docking connection.
//!
//! Provides:
//! - `identify`: which resource types exist on both sides, and which way each flows
//! - `balance`: the multi-source/multi-sink split of one resource for one tick,
//!   on pool snapshots
//! - `transfer_all`: snapshot, balance and write back every eligible resource

pub mod apply;
pub mod balancer;
pub mod matcher;

pub use apply::{TickTransfer, transfer_all, transfer_resource};
pub use balancer::{BalanceOutcome, PoolSnapshot, RateBudget, balance};
pub use matcher::{
    Direction, EligibleResource, EligibleResourceSet, MatchRules, identify, pools_by_resource,
};
