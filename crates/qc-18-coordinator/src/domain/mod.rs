//! # Domain Module
//!
//! Core domain types for executor coordination.
//!
//! - value_objects: addresses, hashes, module bitsets
//! - executor: staked executor record and commitment slot
//! - active_set: swap-delete array of active executors
//! - phase: epoch phase classification
//! - pools: epoch, next-epoch and protocol pots
//! - invariants: conservation, no-gap and module-floor checks

pub mod active_set;
pub mod executor;
pub mod invariants;
pub mod phase;
pub mod pools;
pub mod value_objects;

pub use active_set::{ActiveSet, Relocation, EMPTY_SLOT};
pub use executor::{CommitData, Executor, MAX_ROUNDS_PER_EPOCH};
pub use invariants::{
    accounted_funds, check_conservation, check_module_floor, check_no_gaps, InvariantViolation,
};
pub use phase::{Phase, PhaseClock, PhaseDurations};
pub use pools::PoolBalances;
pub use value_objects::{keccak256, Address, Hash, ModuleId, ModuleSet, MIN_REGISTERED_MODULES};
