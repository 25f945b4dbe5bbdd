//! # Slashing Split
//!
//! A penalty is `amount_per_module * module_count`, capped at the
//! offender's balance. Half goes to the reporting recipient, the rest
//! (including any odd unit) to the protocol pot.

use serde::{Deserialize, Serialize};

/// Kind of slashable offense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlashKind {
    /// Designated for a round and never checked in
    Inactive,
    /// Committed but never revealed
    Committer,
}

impl SlashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlashKind::Inactive => "inactive",
            SlashKind::Committer => "committer",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlashSplit {
    pub penalty: u128,
    pub recipient_share: u128,
    pub protocol_share: u128,
}

pub fn compute_slash(amount_per_module: u128, module_count: u32, balance: u128) -> SlashSplit {
    let penalty = amount_per_module
        .saturating_mul(module_count as u128)
        .min(balance);
    let recipient_share = penalty / 2;
    SlashSplit {
        penalty,
        recipient_share,
        protocol_share: penalty - recipient_share,
    }
}
