//! Pooled balances held by the coordinator outside executor accounts.

use serde::{Deserialize, Serialize};

/// The three disjoint pots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalances {
    /// Distributed at the end of the current epoch
    pub epoch_pool: u128,
    /// Accumulates taxes collected outside rounds; folded in at rollover
    pub next_epoch_pool: u128,
    /// Protocol treasury, withdrawable by the owner
    pub protocol: u128,
}

impl PoolBalances {
    pub fn total(&self) -> u128 {
        self.epoch_pool
            .saturating_add(self.next_epoch_pool)
            .saturating_add(self.protocol)
    }
}
