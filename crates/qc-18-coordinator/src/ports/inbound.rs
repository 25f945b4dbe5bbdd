//! Driving Ports (API - Inbound)
//!
//! Every operation takes the calling address explicitly and executes as
//! one indivisible step.

use crate::domain::{Address, Hash, ModuleSet};
use crate::error::CoordinatorResult;
use serde::{Deserialize, Serialize};

/// Result of `execute_batch`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub standard_tax: u128,
    pub zero_fee_tax: u128,
    pub success_count: u32,
    pub failure_count: u32,
}

/// Primary coordinator API.
pub trait CoordinatorApi: Send + Sync {
    /// Stake for `modules`; returns the amount pulled from the caller.
    fn stake(&self, caller: Address, modules: ModuleSet) -> CoordinatorResult<u128>;

    fn topup(&self, caller: Address, amount: u128) -> CoordinatorResult<()>;

    /// Remove the executor and refund its balance; returns the refund.
    fn unstake(&self, caller: Address) -> CoordinatorResult<u128>;

    /// Add modules; returns the extra stake charged.
    fn register_modules(&self, caller: Address, modules: ModuleSet) -> CoordinatorResult<u128>;

    fn deregister_modules(&self, caller: Address, modules: ModuleSet) -> CoordinatorResult<()>;

    fn execute_batch(
        &self,
        caller: Address,
        indices: &[u64],
        gas_limits: &[u64],
        fee_recipient: Address,
        registry_index: usize,
    ) -> CoordinatorResult<BatchOutcome>;

    fn slash_inactive_executor(
        &self,
        caller: Address,
        executor: Address,
        round: u32,
        recipient: Address,
    ) -> CoordinatorResult<u128>;

    fn slash_committer(
        &self,
        caller: Address,
        executor: Address,
        recipient: Address,
    ) -> CoordinatorResult<u128>;

    fn commit(&self, caller: Address, commitment: Hash) -> CoordinatorResult<()>;

    fn reveal(&self, caller: Address, signature: &[u8]) -> CoordinatorResult<()>;

    fn initiate_epoch(&self, caller: Address) -> CoordinatorResult<()>;

    fn withdraw_staking_balance(&self, caller: Address, amount: u128) -> CoordinatorResult<()>;

    /// Owner only. Returns the amount withdrawn.
    fn withdraw_protocol_balance(
        &self,
        caller: Address,
        recipient: Address,
    ) -> CoordinatorResult<u128>;
}
