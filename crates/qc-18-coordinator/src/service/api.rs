//! # CoordinatorApi Implementation
//!
//! Wraps each operation in `transact` and records metrics on success.

use super::*;
use crate::metrics;
use crate::ports::inbound::{BatchOutcome, CoordinatorApi};

impl<L, C> CoordinatorApi for Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    fn stake(&self, caller: Address, modules: ModuleSet) -> CoordinatorResult<u128> {
        let amount =
            self.transact("stake", |state, now| self.apply_stake(state, now, caller, modules))?;
        metrics::record_stake();
        self.observe();
        Ok(amount)
    }

    fn topup(&self, caller: Address, amount: u128) -> CoordinatorResult<()> {
        self.transact("topup", |state, now| {
            self.apply_topup(state, now, caller, amount)
        })?;
        self.observe();
        Ok(())
    }

    fn unstake(&self, caller: Address) -> CoordinatorResult<u128> {
        let refund = self.transact("unstake", |state, now| {
            self.apply_unstake(state, now, caller)
        })?;
        self.observe();
        Ok(refund)
    }

    fn register_modules(&self, caller: Address, modules: ModuleSet) -> CoordinatorResult<u128> {
        self.transact("register_modules", |state, now| {
            self.apply_register_modules(state, now, caller, modules)
        })
    }

    fn deregister_modules(&self, caller: Address, modules: ModuleSet) -> CoordinatorResult<()> {
        self.transact("deregister_modules", |state, now| {
            self.apply_deregister_modules(state, now, caller, modules)
        })
    }

    fn execute_batch(
        &self,
        caller: Address,
        indices: &[u64],
        gas_limits: &[u64],
        fee_recipient: Address,
        registry_index: usize,
    ) -> CoordinatorResult<BatchOutcome> {
        let outcome = self.transact("execute_batch", |state, now| {
            self.apply_execute_batch(
                state,
                now,
                caller,
                indices,
                gas_limits,
                fee_recipient,
                registry_index,
            )
        })?;
        metrics::record_batch(outcome.success_count, outcome.failure_count);
        self.observe();
        Ok(outcome)
    }

    fn slash_inactive_executor(
        &self,
        caller: Address,
        executor: Address,
        round: u32,
        recipient: Address,
    ) -> CoordinatorResult<u128> {
        let split = self.transact("slash_inactive_executor", |state, now| {
            self.apply_slash_inactive_executor(state, now, executor, round, recipient)
        })?;
        debug!(
            "[qc-18] inactive slash for round {} reported by {}",
            round,
            hex::encode(caller)
        );
        metrics::record_slash("inactive");
        self.observe();
        Ok(split.penalty)
    }

    fn slash_committer(
        &self,
        caller: Address,
        executor: Address,
        recipient: Address,
    ) -> CoordinatorResult<u128> {
        let split = self.transact("slash_committer", |state, now| {
            self.apply_slash_committer(state, now, executor, recipient)
        })?;
        debug!(
            "[qc-18] committer slash of {} reported by {}",
            hex::encode(executor),
            hex::encode(caller)
        );
        metrics::record_slash("committer");
        self.observe();
        Ok(split.penalty)
    }

    fn commit(&self, caller: Address, commitment: Hash) -> CoordinatorResult<()> {
        self.transact("commit", |state, now| {
            self.apply_commit(state, now, caller, commitment)
        })
    }

    fn reveal(&self, caller: Address, signature: &[u8]) -> CoordinatorResult<()> {
        self.transact("reveal", |state, now| {
            self.apply_reveal(state, now, caller, signature)
        })
    }

    fn initiate_epoch(&self, caller: Address) -> CoordinatorResult<()> {
        let plan = self.transact("initiate_epoch", |state, now| {
            self.apply_initiate_epoch(state, now)
        })?;
        debug!(
            "[qc-18] rollover triggered by {}, per-round cap {}",
            hex::encode(caller),
            plan.per_round_cap
        );
        metrics::record_epoch_initiated();
        self.observe();
        Ok(())
    }

    fn withdraw_staking_balance(&self, caller: Address, amount: u128) -> CoordinatorResult<()> {
        self.transact("withdraw_staking_balance", |state, _| {
            self.apply_withdraw_staking_balance(state, caller, amount)
        })?;
        self.observe();
        Ok(())
    }

    fn withdraw_protocol_balance(
        &self,
        caller: Address,
        recipient: Address,
    ) -> CoordinatorResult<u128> {
        let amount = self.transact("withdraw_protocol_balance", |state, _| {
            self.apply_withdraw_protocol_balance(state, caller, recipient)
        })?;
        self.observe();
        Ok(amount)
    }
}
