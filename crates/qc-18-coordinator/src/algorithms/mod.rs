//! # Algorithms Module
//!
//! Pure functions behind the coordinator's state transitions.

pub mod randomness;
pub mod rewards;
pub mod selection;
pub mod slashing;

pub use randomness::{
    address_of, commitment_of, epoch_seed, fold_seed, recover_revealer, reveal_message,
    sign_reveal, verify_reveal, REVEAL_SIGNATURE_LEN,
};
pub use rewards::{plan_distribution, DistributionPlan, Participation, BPS_DENOMINATOR};
pub use selection::select;
pub use slashing::{compute_slash, SlashKind, SlashSplit};
