//! # Executor Entity
//!
//! One record per staked participant. Created on first stake, mutated by
//! every call that touches the address, removed on unstake.

use super::value_objects::{Address, Hash, ModuleSet};
use serde::{Deserialize, Serialize};

/// Upper bound on rounds per epoch; round marks are a `u64` bitset.
pub const MAX_ROUNDS_PER_EPOCH: u32 = u64::BITS;

fn round_bit(round: u32) -> u64 {
    1u64.checked_shl(round).unwrap_or(0)
}

/// Staked executor record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    pub address: Address,
    /// Internal ledger balance in the staking token's smallest unit
    pub balance: u128,
    pub active: bool,
    pub initialized: bool,
    /// Position in the active set; only meaningful while `active`
    pub array_index: usize,
    pub rounds_checked_in_epoch: u32,
    pub last_checkin_round: u32,
    pub last_checkin_epoch: u64,
    pub executions_in_rounds_in_epoch: u32,
    /// Epoch that `checked_in_rounds` and `slashed_rounds` refer to
    pub round_marks_epoch: u64,
    /// Bit `r` set once the executor checked in for round `r`
    pub checked_in_rounds: u64,
    /// Bit `r` set once the executor was slashed for missing round `r`
    pub slashed_rounds: u64,
    pub last_registration_timestamp: u64,
    pub registered_modules: ModuleSet,
}

impl Executor {
    /// Fresh, fully active record produced by `stake`.
    pub fn staked(
        address: Address,
        balance: u128,
        modules: ModuleSet,
        array_index: usize,
        now: u64,
    ) -> Self {
        Self {
            address,
            balance,
            active: true,
            initialized: true,
            array_index,
            registered_modules: modules,
            last_registration_timestamp: now,
            ..Default::default()
        }
    }

    pub fn module_count(&self) -> u32 {
        self.registered_modules.count()
    }

    /// `per_module * module_count`, saturating.
    pub fn per_module_amount(&self, per_module: u128) -> u128 {
        per_module.saturating_mul(self.module_count() as u128)
    }

    pub fn has_checked_in(&self, epoch: u64, round: u32) -> bool {
        self.round_marks_epoch == epoch && self.checked_in_rounds & round_bit(round) != 0
    }

    pub fn has_checked_in_this_epoch(&self, epoch: u64) -> bool {
        self.last_checkin_epoch == epoch
    }

    pub fn is_slashed_for(&self, epoch: u64, round: u32) -> bool {
        self.round_marks_epoch == epoch && self.slashed_rounds & round_bit(round) != 0
    }

    /// Drop round marks left over from an earlier epoch.
    fn roll_round_marks(&mut self, epoch: u64) {
        if self.round_marks_epoch != epoch {
            self.round_marks_epoch = epoch;
            self.checked_in_rounds = 0;
            self.slashed_rounds = 0;
        }
    }

    /// Record work done as the designated executor.
    ///
    /// The round counter advances once per (epoch, round); executions
    /// accumulate on every call.
    pub fn record_checkin(&mut self, epoch: u64, round: u32, executions: u32) {
        if !self.has_checked_in(epoch, round) {
            self.roll_round_marks(epoch);
            self.checked_in_rounds |= round_bit(round);
            self.rounds_checked_in_epoch = self.rounds_checked_in_epoch.saturating_add(1);
        }
        self.last_checkin_round = round;
        self.last_checkin_epoch = epoch;
        self.executions_in_rounds_in_epoch =
            self.executions_in_rounds_in_epoch.saturating_add(executions);
    }

    /// Mark (epoch, round) as slashed. Participation is not credited.
    pub fn mark_slashed(&mut self, epoch: u64, round: u32) {
        self.roll_round_marks(epoch);
        self.slashed_rounds |= round_bit(round);
    }

    /// Reset the per-epoch participation counters.
    pub fn reset_epoch_counters(&mut self) {
        self.rounds_checked_in_epoch = 0;
        self.executions_in_rounds_in_epoch = 0;
    }
}

/// Commitment slot, overwritten each epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    pub commitment: Hash,
    pub epoch: u64,
    /// Monotonic false -> true (set by reveal or by committer slashing)
    pub revealed: bool,
}

impl CommitData {
    pub fn new(commitment: Hash, epoch: u64) -> Self {
        Self {
            commitment,
            epoch,
            revealed: false,
        }
    }

    pub fn is_pending_in(&self, epoch: u64) -> bool {
        self.epoch == epoch && !self.revealed
    }
}
