//! # Epoch Reward Distribution
//!
//! At rollover the protocol takes `epoch_pool * cut_bps / 10_000`. The rest
//! is split into `rounds_per_epoch` equal shares; each participant earns
//!
//! ```text
//! min(executions * max_reward_per_execution, rounds_checked_in * per_round_cap)
//! ```
//!
//! Payouts never exceed what remains after the protocol cut, so
//! `new_epoch_pool = old + next - distributed - cut` cannot underflow.

use crate::domain::Address;

pub const BPS_DENOMINATOR: u128 = 10_000;

/// Participation recorded for one pool-cut receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Participation {
    pub address: Address,
    pub rounds_checked_in: u32,
    pub executions: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionPlan {
    pub protocol_cut: u128,
    pub per_round_cap: u128,
    pub rewards: Vec<(Address, u128)>,
    pub total_distributed: u128,
}

impl DistributionPlan {
    /// Epoch pool for the next epoch.
    pub fn next_epoch_pool(&self, epoch_pool: u128, next_epoch_pool: u128) -> u128 {
        epoch_pool
            .saturating_add(next_epoch_pool)
            .saturating_sub(self.total_distributed)
            .saturating_sub(self.protocol_cut)
    }
}

pub fn plan_distribution(
    epoch_pool: u128,
    protocol_cut_bps: u16,
    rounds_per_epoch: u32,
    max_reward_per_execution: u128,
    participants: &[Participation],
) -> DistributionPlan {
    let protocol_cut = epoch_pool.saturating_mul(protocol_cut_bps as u128) / BPS_DENOMINATOR;
    let remaining = epoch_pool - protocol_cut;
    let per_round_cap = remaining / rounds_per_epoch.max(1) as u128;

    let mut budget = remaining;
    let mut rewards = Vec::with_capacity(participants.len());
    for p in participants {
        let by_volume = (p.executions as u128).saturating_mul(max_reward_per_execution);
        let by_rounds = (p.rounds_checked_in as u128).saturating_mul(per_round_cap);
        let reward = by_volume.min(by_rounds).min(budget);
        budget -= reward;
        rewards.push((p.address, reward));
    }

    DistributionPlan {
        protocol_cut,
        per_round_cap,
        rewards,
        total_distributed: remaining - budget,
    }
}
