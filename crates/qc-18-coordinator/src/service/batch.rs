//! # Batch Execution Accounting
//!
//! Per-job failures are counted and skipped. Authorization and tax
//! failures reject the whole batch.

use super::*;
use crate::ports::inbound::BatchOutcome;

fn add_tax(total: u128, tax: u128) -> CoordinatorResult<u128> {
    total
        .checked_add(tax)
        .ok_or(CoordinatorError::ArithmeticOverflow("execution tax"))
}

impl<L, C> Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    #[allow(clippy::too_many_arguments)]
    pub(super) fn apply_execute_batch(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        indices: &[u64],
        gas_limits: &[u64],
        fee_recipient: Address,
        registry_index: usize,
    ) -> CoordinatorResult<BatchOutcome> {
        if indices.len() != gas_limits.len() {
            return Err(CoordinatorError::LengthMismatch {
                indices: indices.len(),
                gas_limits: gas_limits.len(),
            });
        }
        let registry = state
            .job_registries
            .get(registry_index)
            .cloned()
            .ok_or(CoordinatorError::UnknownJobRegistry(registry_index))?;

        let phase = self.phase_at(state, now);
        if phase == Phase::EpochElapsed {
            return Err(CoordinatorError::EpochElapsed {
                epoch_end_time: state.epoch_end_time,
            });
        }

        // No designation without active executors
        let round = phase.open_round().filter(|_| !state.active.is_empty());
        let designated = round
            .and_then(|r| select(&state.seed, r, state.active.len()))
            .and_then(|index| state.active.get(index));
        let designated_modules = designated
            .and_then(|address| state.executors.get(&address))
            .map(|e| e.registered_modules)
            .unwrap_or(ModuleSet::EMPTY);
        let caller_modules = state.initialized(&caller).map(|e| e.registered_modules);
        let is_designated = designated == Some(caller);

        let mut outcome = BatchOutcome::default();
        let mut round_tax = 0u128;
        let mut pool_tax = 0u128;
        let mut taxed_executions = 0u32;

        for (&index, &gas_limit) in indices.iter().zip(gas_limits) {
            let job = match registry.execute(index, gas_limit, &fee_recipient) {
                Ok(job) => job,
                Err(e) => {
                    debug!("[qc-18] job {} skipped: {}", index, e);
                    outcome.failure_count += 1;
                    continue;
                }
            };
            outcome.success_count += 1;

            if job.in_zero_fee_window {
                outcome.zero_fee_tax =
                    add_tax(outcome.zero_fee_tax, self.config.zero_fee_execution_tax)?;
                continue;
            }

            if round.is_some() {
                if is_designated {
                    let supported = caller_modules
                        .map(|m| m.supports(job.execution_module, job.fee_module))
                        .unwrap_or(false);
                    if !supported {
                        return Err(CoordinatorError::ModulesNotSupported {
                            execution_module: job.execution_module,
                            fee_module: job.fee_module,
                        });
                    }
                } else if designated_modules.supports(job.execution_module, job.fee_module) {
                    return Err(CoordinatorError::DesignatedExecutorSupportsModules {
                        execution_module: job.execution_module,
                        fee_module: job.fee_module,
                    });
                }
                round_tax = add_tax(round_tax, self.config.execution_tax)?;
            } else {
                pool_tax = add_tax(pool_tax, self.config.execution_tax)?;
            }
            taxed_executions += 1;
        }

        outcome.standard_tax = add_tax(round_tax, pool_tax)?;
        let total_tax = add_tax(outcome.standard_tax, outcome.zero_fee_tax)?;
        let zero_fee_pool = outcome.zero_fee_tax / 2;
        let zero_fee_protocol = outcome.zero_fee_tax - zero_fee_pool;

        let pays_from_balance = match state.initialized_mut(&caller) {
            Some(executor) => {
                if executor.balance < total_tax {
                    return Err(CoordinatorError::InsufficientBalance {
                        have: executor.balance,
                        need: total_tax,
                    });
                }
                executor.balance -= total_tax;
                true
            }
            None => false,
        };

        state.pools.protocol = add_tax(state.pools.protocol, add_tax(round_tax, zero_fee_protocol)?)?;
        state.pools.next_epoch_pool =
            add_tax(state.pools.next_epoch_pool, add_tax(pool_tax, zero_fee_pool)?)?;

        if let Some(round) = round.filter(|_| is_designated && taxed_executions > 0) {
            self.check_in(state, caller, round, taxed_executions);
        }
        state.enforce_threshold(caller, self.config.staking_balance_threshold_per_module);

        state.pending_events.push(CoordinatorEvent::BatchExecuted {
            caller,
            standard_tax: outcome.standard_tax,
            zero_fee_tax: outcome.zero_fee_tax,
            success_count: outcome.success_count,
            failure_count: outcome.failure_count,
        });

        if !pays_from_balance && total_tax > 0 {
            self.ledger
                .transfer_from(&self.custody, &caller, &self.custody, total_tax)?;
        }

        info!(
            "[qc-18] batch by {}: {} ok, {} failed, tax {} + {}",
            hex::encode(caller),
            outcome.success_count,
            outcome.failure_count,
            outcome.standard_tax,
            outcome.zero_fee_tax
        );
        Ok(outcome)
    }

    /// Credit the designated caller for `round`; the first check-in of an
    /// epoch makes it a pool-cut receiver.
    fn check_in(&self, state: &mut CoordinatorState, caller: Address, round: u32, executions: u32) {
        let epoch = state.epoch;
        let Some(executor) = state.initialized_mut(&caller) else {
            return;
        };
        let first_this_epoch = !executor.has_checked_in_this_epoch(epoch);
        executor.record_checkin(epoch, round, executions);

        if first_this_epoch && !state.pool_cut_receivers.contains(&caller) {
            state.pool_cut_receivers.push(caller);
        }
        state.pending_events.push(CoordinatorEvent::CheckedIn {
            executor: caller,
            epoch,
            round,
            executions,
        });
        debug!(
            "[qc-18] {} checked in for epoch {} round {}",
            hex::encode(caller),
            epoch,
            round
        );
    }
}
