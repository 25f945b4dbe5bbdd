//! # Coordinator Service
//!
//! The single coordination-state object implementing `CoordinatorApi`.
//!
//! ## Architecture
//!
//! - Every public operation runs against a clone of the state and is swapped
//!   in only when it succeeds, so a rejection never leaves partial state.
//! - Token ledger calls are made last, after all checks have passed.
//! - State sits behind a `ReentrantMutex`: calls from other threads
//!   serialize, while a same-thread re-entry from inside a collaborator
//!   callback is rejected with `CoordinatorError::Reentrancy`.

mod admin;
mod api;
mod batch;
mod epoch;
mod slashing;
mod staking;
#[cfg(test)]
mod tests;

use crate::algorithms::select;
use crate::config::CoordinatorConfig;
use crate::domain::{
    Address, CommitData, Executor, Hash, InvariantViolation, ModuleSet, Phase, PhaseClock,
    PoolBalances,
};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::events::CoordinatorEvent;
use crate::ports::outbound::{Clock, TokenLedger};
use crate::state::CoordinatorState;
use parking_lot::ReentrantMutex;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Dependencies for `Coordinator`
pub struct CoordinatorDependencies<L, C> {
    pub ledger: Arc<L>,
    pub clock: Arc<C>,
}

struct Guarded {
    state: RefCell<CoordinatorState>,
    /// Set while an operation is in flight
    busy: Cell<bool>,
}

/// Clears the in-flight flag on every exit path.
struct BusyFlag<'a>(&'a Cell<bool>);

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The executor coordinator.
pub struct Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    pub(crate) config: CoordinatorConfig,
    pub(crate) phase_clock: PhaseClock,
    /// Privileged address for catalog, registry and protocol withdrawals
    pub(crate) owner: Address,
    /// Address at which the coordinator holds custodied tokens
    pub(crate) custody: Address,
    pub(crate) ledger: Arc<L>,
    pub(crate) clock: Arc<C>,
    inner: ReentrantMutex<Guarded>,
}

impl<L, C> Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    /// Create a coordinator whose first epoch (epoch 1) starts now.
    pub fn new(
        config: CoordinatorConfig,
        owner: Address,
        custody: Address,
        deps: CoordinatorDependencies<L, C>,
    ) -> CoordinatorResult<Self> {
        config
            .validate()
            .map_err(|e| CoordinatorError::InvalidConfig(e.to_string()))?;

        let phase_clock = PhaseClock::new(config.phase_durations());
        let now = deps.clock.now();
        let epoch_end_time = now
            .checked_add(config.epoch_duration())
            .ok_or(CoordinatorError::ArithmeticOverflow("epoch end time"))?;
        let state = CoordinatorState::new(
            1,
            epoch_end_time,
            crate::algorithms::epoch_seed(config.chain_id, 1),
        );

        info!(
            "[qc-18] Coordinator started: epoch 1 ends at {}, {} rounds of {}s",
            epoch_end_time, config.rounds_per_epoch, config.round_duration
        );

        Ok(Self {
            config,
            phase_clock,
            owner,
            custody,
            ledger: deps.ledger,
            clock: deps.clock,
            inner: ReentrantMutex::new(Guarded {
                state: RefCell::new(state),
                busy: Cell::new(false),
            }),
        })
    }

    /// Run `f` against a working copy of the state and commit it on success.
    fn transact<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut CoordinatorState, u64) -> CoordinatorResult<T>,
    ) -> CoordinatorResult<T> {
        let guard = self.inner.lock();
        if guard.busy.get() {
            warn!("[qc-18] Reentrant {} rejected", operation);
            return Err(CoordinatorError::Reentrancy);
        }
        guard.busy.set(true);
        let _busy = BusyFlag(&guard.busy);

        let mut working = guard.state.borrow().clone();
        let now = self.clock.now();
        let result = f(&mut working, now);

        match &result {
            Ok(_) => *guard.state.borrow_mut() = working,
            Err(e) => debug!("[qc-18] {} rejected: {}", operation, e),
        }
        result
    }

    fn read<T>(&self, f: impl FnOnce(&CoordinatorState) -> T) -> T {
        let guard = self.inner.lock();
        let state = guard.state.borrow();
        f(&state)
    }

    fn phase_at(&self, state: &CoordinatorState, now: u64) -> Phase {
        self.phase_clock.classify(state.epoch_end_time, now)
    }

    fn require_owner(&self, caller: &Address) -> CoordinatorResult<()> {
        if *caller != self.owner {
            return Err(CoordinatorError::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Push current gauges to the metrics registry.
    fn observe(&self) {
        let (active, pools) = self.read(|s| (s.active.len(), s.pools));
        crate::metrics::set_active_executors(active);
        crate::metrics::set_pot_balances(pools.epoch_pool, pools.next_epoch_pool, pools.protocol);
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    pub fn executor(&self, address: &Address) -> Option<Executor> {
        self.read(|s| s.executors.get(address).cloned())
    }

    pub fn commit_data(&self, address: &Address) -> Option<CommitData> {
        self.read(|s| s.commits.get(address).cloned())
    }

    pub fn active_executors(&self) -> Vec<Address> {
        self.read(|s| s.active.as_slice().to_vec())
    }

    pub fn number_of_active_executors(&self) -> usize {
        self.read(|s| s.active.len())
    }

    pub fn epoch(&self) -> u64 {
        self.read(|s| s.epoch)
    }

    pub fn epoch_end_time(&self) -> u64 {
        self.read(|s| s.epoch_end_time)
    }

    pub fn seed(&self) -> Hash {
        self.read(|s| s.seed)
    }

    pub fn pools(&self) -> PoolBalances {
        self.read(|s| s.pools)
    }

    pub fn pool_cut_receivers(&self) -> Vec<Address> {
        self.read(|s| s.pool_cut_receivers.clone())
    }

    /// Module catalog, indexed by module id.
    pub fn modules(&self) -> Vec<String> {
        self.read(|s| s.modules.clone())
    }

    pub fn valid_modules(&self) -> ModuleSet {
        self.read(|s| s.valid_modules())
    }

    pub fn current_phase(&self) -> Phase {
        let now = self.clock.now();
        self.read(|s| self.phase_at(s, now))
    }

    /// Executor designated for `round` under the current seed and active set.
    pub fn designated_executor(&self, round: u32) -> Option<Address> {
        self.read(|s| {
            select(&s.seed, round, s.active.len()).and_then(|index| s.active.get(index))
        })
    }

    /// Tokens held at the custody address.
    pub fn total_custodied(&self) -> u128 {
        self.ledger.balance_of(&self.custody)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let custodied = self.total_custodied();
        self.read(|s| s.check_invariants(custodied))
    }

    /// Take all buffered events. Returns nothing while an operation is in
    /// flight.
    pub fn drain_events(&self) -> Vec<CoordinatorEvent> {
        let guard = self.inner.lock();
        if guard.busy.get() {
            return Vec::new();
        }
        let events = std::mem::take(&mut guard.state.borrow_mut().pending_events);
        events
    }
}
