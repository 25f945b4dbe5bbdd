//! # QC-18 Executor Coordination
//!
//! Epoch/round coordination engine for a pool of staked executors that
//! rotate through scheduled jobs.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Phase clock: commit, reveal, rounds (open or buffer), slashing, elapsed
//! - Commit-reveal randomness folded into a per-epoch seed
//! - Designated executor per round: `keccak256(seed ‖ round) mod n`
//! - Staking ledger with a swap-delete active set
//! - Slashing of absent designated executors and of unrevealed commitments
//! - Taxed batch execution feeding the reward and protocol pots
//! - Epoch rollover with a protocol cut and capped per-executor rewards
//!
//! ## Epoch Layout
//!
//! ```text
//! epochStart                                                     epochEndTime
//! │ commit │ reveal │ round 0 │buf│ round 1 │buf│ ... │ slashing │ elapsed →
//! ```
//!
//! ## Conservation
//!
//! At every point between operations:
//!
//! ```text
//! Σ executor.balance + epoch_pool + next_epoch_pool + protocol == custodied tokens
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-coordinator/
//! ├── domain/          # Executor, ActiveSet, PhaseClock, ModuleSet, invariants
//! ├── algorithms/      # randomness, selection, slashing split, rewards
//! ├── ports/           # CoordinatorApi, TokenLedger, JobRegistry, Clock
//! ├── adapters/        # in-memory ledger, clocks, scripted job registry
//! └── service/         # Coordinator
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use qc_18_coordinator::{Coordinator, CoordinatorApi, CoordinatorConfig, CoordinatorDependencies};
//!
//! let coordinator = Coordinator::new(config, owner, custody, CoordinatorDependencies { ledger, clock })?;
//! coordinator.add_module(owner, "keeper")?;
//! coordinator.add_module(owner, "native-fee")?;
//! coordinator.stake(executor, ModuleSet::from_ids(&[0, 1]))?;
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod state;

// Re-exports
pub use adapters::{InMemoryTokenLedger, ManualClock, ScriptedJobRegistry, SystemClock};
pub use algorithms::{
    commitment_of, compute_slash, epoch_seed, plan_distribution, reveal_message, select,
    sign_reveal, SlashKind,
};
pub use config::{ConfigError, CoordinatorConfig};
pub use domain::{
    ActiveSet, Address, CommitData, Executor, Hash, InvariantViolation, ModuleId, ModuleSet,
    Phase, PhaseClock, PoolBalances,
};
pub use error::{CoordinatorError, CoordinatorResult, JobError, TokenError};
pub use events::{CoordinatorEvent, DeactivationReason};
pub use ports::{BatchOutcome, Clock, CoordinatorApi, JobExecution, JobRegistry, TokenLedger};
pub use service::{Coordinator, CoordinatorDependencies};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
