//! # Designated Executor Selection
//!
//! `select(seed, round) = keccak256(seed ‖ round) mod n`
//!
//! Evaluated on demand and never stored, so it tracks changes to the
//! active set size automatically.

use crate::domain::{keccak256, Hash};
use primitive_types::U256;

/// Index into the active set designated for `round`, or `None` when the
/// set is empty.
pub fn select(seed: &Hash, round: u32, active_count: usize) -> Option<usize> {
    if active_count == 0 {
        return None;
    }
    let mut round_word = [0u8; 32];
    round_word[28..].copy_from_slice(&round.to_be_bytes());
    let digest = U256::from_big_endian(&keccak256(&[seed, &round_word]));
    Some((digest % U256::from(active_count)).low_u64() as usize)
}
