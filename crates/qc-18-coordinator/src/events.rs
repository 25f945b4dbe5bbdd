//! Outgoing audit events for the Coordinator subsystem
//!
//! Buffered in coordinator state and drained by the host with
//! `Coordinator::drain_events`. A rejected operation emits nothing.

use crate::algorithms::SlashKind;
use crate::domain::{Address, Hash, ModuleSet};
use serde::{Deserialize, Serialize};

/// Why an executor left the active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationReason {
    /// Balance fell below the per-module threshold
    BelowThreshold,
    Unstaked,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoordinatorEvent {
    ExecutorActivated {
        executor: Address,
        array_index: usize,
    },
    ExecutorDeactivated {
        executor: Address,
        reason: DeactivationReason,
    },
    Unstaked {
        executor: Address,
        refund: u128,
    },
    ModulesRegistered {
        executor: Address,
        modules: ModuleSet,
        amount_charged: u128,
    },
    ModulesDeregistered {
        executor: Address,
        modules: ModuleSet,
    },
    CommitmentMade {
        executor: Address,
        epoch: u64,
        commitment: Hash,
    },
    CommitmentRevealed {
        executor: Address,
        epoch: u64,
        seed: Hash,
    },
    CheckedIn {
        executor: Address,
        epoch: u64,
        round: u32,
        executions: u32,
    },
    BatchExecuted {
        caller: Address,
        standard_tax: u128,
        zero_fee_tax: u128,
        success_count: u32,
        failure_count: u32,
    },
    Slashed {
        kind: SlashKind,
        executor: Address,
        recipient: Address,
        penalty: u128,
    },
    EpochInitiated {
        epoch: u64,
        epoch_end_time: u64,
        protocol_cut: u128,
        total_distributed: u128,
    },
    ProtocolBalanceWithdrawn {
        recipient: Address,
        amount: u128,
    },
}

impl CoordinatorEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecutorActivated { .. } => "executor_activated",
            Self::ExecutorDeactivated { .. } => "executor_deactivated",
            Self::Unstaked { .. } => "unstaked",
            Self::ModulesRegistered { .. } => "modules_registered",
            Self::ModulesDeregistered { .. } => "modules_deregistered",
            Self::CommitmentMade { .. } => "commitment_made",
            Self::CommitmentRevealed { .. } => "commitment_revealed",
            Self::CheckedIn { .. } => "checked_in",
            Self::BatchExecuted { .. } => "batch_executed",
            Self::Slashed { .. } => "slashed",
            Self::EpochInitiated { .. } => "epoch_initiated",
            Self::ProtocolBalanceWithdrawn { .. } => "protocol_balance_withdrawn",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
