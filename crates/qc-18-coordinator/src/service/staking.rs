//! # Staking Ledger Operations
//!
//! Stake, topup and module registration are open only in the commit phase
//! or once the epoch has elapsed. Unstake and deregistration are open only
//! once the epoch has elapsed.

use super::*;
use crate::domain::MIN_REGISTERED_MODULES;
use crate::events::DeactivationReason;

impl<L, C> Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    fn require_staking_window(
        &self,
        state: &CoordinatorState,
        now: u64,
        operation: &'static str,
    ) -> CoordinatorResult<()> {
        let phase = self.phase_at(state, now);
        if !phase.allows_staking() {
            return Err(CoordinatorError::WrongPhase { operation, phase });
        }
        Ok(())
    }

    fn require_unstaking_window(
        &self,
        state: &CoordinatorState,
        now: u64,
        operation: &'static str,
    ) -> CoordinatorResult<()> {
        let phase = self.phase_at(state, now);
        if !phase.allows_unstaking() {
            return Err(CoordinatorError::WrongPhase { operation, phase });
        }
        Ok(())
    }

    fn require_registration_period(&self, executor: &Executor, now: u64) -> CoordinatorResult<()> {
        let available_at = executor
            .last_registration_timestamp
            .saturating_add(self.config.minimum_registration_period);
        if now < available_at {
            return Err(CoordinatorError::MinimumRegistrationPeriod { available_at, now });
        }
        Ok(())
    }

    fn stake_for(&self, count: u32) -> CoordinatorResult<u128> {
        self.config
            .staking_amount_per_module
            .checked_mul(count as u128)
            .ok_or(CoordinatorError::ArithmeticOverflow("stake amount"))
    }

    pub(super) fn apply_stake(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        modules: ModuleSet,
    ) -> CoordinatorResult<u128> {
        self.require_staking_window(state, now, "stake")?;
        if state.initialized(&caller).is_some() {
            return Err(CoordinatorError::AlreadyStaked(caller));
        }

        let modules = modules.intersection(&state.valid_modules());
        let count = modules.count();
        if count < MIN_REGISTERED_MODULES {
            return Err(CoordinatorError::InsufficientModules {
                count,
                minimum: MIN_REGISTERED_MODULES,
            });
        }
        let amount = self.stake_for(count)?;

        state
            .executors
            .insert(caller, Executor::staked(caller, amount, modules, 0, now));
        state.activate(caller);
        state.pending_events.push(CoordinatorEvent::ModulesRegistered {
            executor: caller,
            modules,
            amount_charged: amount,
        });

        self.ledger
            .transfer_from(&self.custody, &caller, &self.custody, amount)?;

        info!(
            "[qc-18] {} staked {} for {} modules",
            hex::encode(caller),
            amount,
            count
        );
        Ok(amount)
    }

    pub(super) fn apply_topup(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        amount: u128,
    ) -> CoordinatorResult<()> {
        self.require_staking_window(state, now, "topup")?;

        let executor = state
            .initialized_mut(&caller)
            .ok_or(CoordinatorError::NotInitialized(caller))?;
        let balance = executor
            .balance
            .checked_add(amount)
            .ok_or(CoordinatorError::ArithmeticOverflow("topup"))?;
        let minimum = executor.per_module_amount(self.config.staking_amount_per_module);
        if balance < minimum {
            return Err(CoordinatorError::BalanceBelowMinimum { balance, minimum });
        }
        executor.balance = balance;
        let reactivate = !executor.active;

        if reactivate {
            state.activate(caller);
        }

        self.ledger
            .transfer_from(&self.custody, &caller, &self.custody, amount)?;

        info!(
            "[qc-18] {} topped up {} (balance {})",
            hex::encode(caller),
            amount,
            balance
        );
        Ok(())
    }

    pub(super) fn apply_unstake(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
    ) -> CoordinatorResult<u128> {
        self.require_unstaking_window(state, now, "unstake")?;
        let executor = state
            .initialized(&caller)
            .cloned()
            .ok_or(CoordinatorError::NotInitialized(caller))?;
        self.require_registration_period(&executor, now)?;

        state.deactivate(caller, DeactivationReason::Unstaked);
        state.executors.remove(&caller);
        state.commits.remove(&caller);

        let refund = executor.balance;
        state.pending_events.push(CoordinatorEvent::Unstaked {
            executor: caller,
            refund,
        });

        if refund > 0 {
            self.ledger.transfer(&self.custody, &caller, refund)?;
        }

        info!("[qc-18] {} unstaked, refunded {}", hex::encode(caller), refund);
        Ok(refund)
    }

    pub(super) fn apply_register_modules(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        modules: ModuleSet,
    ) -> CoordinatorResult<u128> {
        self.require_staking_window(state, now, "register_modules")?;

        let valid = state.valid_modules();
        let executor = state
            .initialized_mut(&caller)
            .ok_or(CoordinatorError::NotInitialized(caller))?;

        let requested = modules.intersection(&valid);
        if requested.is_empty() {
            return Err(CoordinatorError::NoModulesToRegister);
        }
        if requested.intersects(&executor.registered_modules) {
            return Err(CoordinatorError::ModulesAlreadyRegistered);
        }

        let charged = self.stake_for(requested.count())?;
        executor.balance = executor
            .balance
            .checked_add(charged)
            .ok_or(CoordinatorError::ArithmeticOverflow("register modules"))?;
        executor.registered_modules = executor.registered_modules.union(&requested);
        executor.last_registration_timestamp = now;

        state.pending_events.push(CoordinatorEvent::ModulesRegistered {
            executor: caller,
            modules: requested,
            amount_charged: charged,
        });

        self.ledger
            .transfer_from(&self.custody, &caller, &self.custody, charged)?;

        info!(
            "[qc-18] {} registered modules {:?}, charged {}",
            hex::encode(caller),
            requested.ids(),
            charged
        );
        Ok(charged)
    }

    pub(super) fn apply_deregister_modules(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        modules: ModuleSet,
    ) -> CoordinatorResult<()> {
        self.require_unstaking_window(state, now, "deregister_modules")?;

        let executor = state
            .initialized(&caller)
            .cloned()
            .ok_or(CoordinatorError::NotInitialized(caller))?;
        self.require_registration_period(&executor, now)?;

        let removed = modules.intersection(&executor.registered_modules);
        if removed.is_empty() {
            return Err(CoordinatorError::NoModulesToDeregister);
        }
        let remaining = executor.registered_modules.difference(&removed);
        if remaining.count() < MIN_REGISTERED_MODULES {
            return Err(CoordinatorError::InsufficientModules {
                count: remaining.count(),
                minimum: MIN_REGISTERED_MODULES,
            });
        }

        if let Some(record) = state.initialized_mut(&caller) {
            record.registered_modules = remaining;
        }
        state.pending_events.push(CoordinatorEvent::ModulesDeregistered {
            executor: caller,
            modules: removed,
        });

        info!(
            "[qc-18] {} deregistered modules {:?}",
            hex::encode(caller),
            removed.ids()
        );
        Ok(())
    }

    pub(super) fn apply_withdraw_staking_balance(
        &self,
        state: &mut CoordinatorState,
        caller: Address,
        amount: u128,
    ) -> CoordinatorResult<()> {
        let executor = state
            .initialized_mut(&caller)
            .ok_or(CoordinatorError::NotInitialized(caller))?;
        if amount > executor.balance {
            return Err(CoordinatorError::InsufficientBalance {
                have: executor.balance,
                need: amount,
            });
        }
        let balance = executor.balance - amount;
        let minimum = executor.per_module_amount(self.config.staking_amount_per_module);
        if balance < minimum {
            return Err(CoordinatorError::BalanceBelowMinimum { balance, minimum });
        }
        executor.balance = balance;

        self.ledger.transfer(&self.custody, &caller, amount)?;

        info!(
            "[qc-18] {} withdrew {} (balance {})",
            hex::encode(caller),
            amount,
            balance
        );
        Ok(())
    }
}
