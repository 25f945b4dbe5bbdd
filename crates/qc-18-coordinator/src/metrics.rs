//! # Coordinator Metrics
//!
//! Prometheus metrics for the executor coordinator.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-coordinator = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `coordinator_stakes_total` - Counter of successful stakes
//! - `coordinator_jobs_executed_total` - Counter of batch items (by outcome)
//! - `coordinator_slashings_total` - Counter of slashings (by kind)
//! - `coordinator_epochs_initiated_total` - Counter of epoch rollovers
//! - `coordinator_active_executors` - Gauge of the active set size
//! - `coordinator_pot_balance` - Gauge of each pot (epoch, next_epoch, protocol)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_gauge, register_gauge_vec, register_int_counter, register_int_counter_vec, Gauge,
    GaugeVec, IntCounter, IntCounterVec,
};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref STAKES: IntCounter = register_int_counter!(
        "coordinator_stakes_total",
        "Total number of successful stakes"
    )
    .expect("Failed to create STAKES metric");

    /// Batch items, labeled by outcome (success / failure)
    pub static ref JOBS_EXECUTED: IntCounterVec = register_int_counter_vec!(
        "coordinator_jobs_executed_total",
        "Total number of batch items processed",
        &["outcome"]
    )
    .expect("Failed to create JOBS_EXECUTED metric");

    /// Slashings, labeled by kind
    pub static ref SLASHINGS: IntCounterVec = register_int_counter_vec!(
        "coordinator_slashings_total",
        "Total number of slashings applied",
        &["kind"]
    )
    .expect("Failed to create SLASHINGS metric");

    pub static ref EPOCHS_INITIATED: IntCounter = register_int_counter!(
        "coordinator_epochs_initiated_total",
        "Total number of epoch rollovers"
    )
    .expect("Failed to create EPOCHS_INITIATED metric");

    pub static ref ACTIVE_EXECUTORS: Gauge = register_gauge!(
        "coordinator_active_executors",
        "Number of executors in the active set"
    )
    .expect("Failed to create ACTIVE_EXECUTORS metric");

    /// Pot balances, labeled by pot
    pub static ref POT_BALANCE: GaugeVec = register_gauge_vec!(
        "coordinator_pot_balance",
        "Balance held in each coordinator pot",
        &["pot"]
    )
    .expect("Failed to create POT_BALANCE metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_stake() {
    STAKES.inc();
}

/// Record one executed batch
#[cfg(feature = "metrics")]
pub fn record_batch(success_count: u32, failure_count: u32) {
    JOBS_EXECUTED
        .with_label_values(&["success"])
        .inc_by(success_count as u64);
    JOBS_EXECUTED
        .with_label_values(&["failure"])
        .inc_by(failure_count as u64);
}

#[cfg(feature = "metrics")]
pub fn record_slash(kind: &str) {
    SLASHINGS.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_epoch_initiated() {
    EPOCHS_INITIATED.inc();
}

#[cfg(feature = "metrics")]
pub fn set_active_executors(count: usize) {
    ACTIVE_EXECUTORS.set(count as f64);
}

/// Update the three pot gauges
#[cfg(feature = "metrics")]
pub fn set_pot_balances(epoch_pool: u128, next_epoch_pool: u128, protocol: u128) {
    POT_BALANCE.with_label_values(&["epoch"]).set(epoch_pool as f64);
    POT_BALANCE
        .with_label_values(&["next_epoch"])
        .set(next_epoch_pool as f64);
    POT_BALANCE.with_label_values(&["protocol"]).set(protocol as f64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_stake() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch(_success_count: u32, _failure_count: u32) {}

#[cfg(not(feature = "metrics"))]
pub fn record_slash(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_epoch_initiated() {}

#[cfg(not(feature = "metrics"))]
pub fn set_active_executors(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_pot_balances(_epoch_pool: u128, _next_epoch_pool: u128, _protocol: u128) {}
