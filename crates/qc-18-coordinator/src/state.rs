//! Coordination state owned by the `Coordinator`.
//!
//! Operations mutate a clone of this struct and swap it in only on success,
//! so a rejected operation leaves the committed state untouched.

use crate::domain::{
    check_conservation, check_module_floor, check_no_gaps, ActiveSet, Address, CommitData,
    Executor, Hash, InvariantViolation, ModuleSet, PoolBalances,
};
use crate::events::{CoordinatorEvent, DeactivationReason};
use crate::ports::outbound::JobRegistry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct CoordinatorState {
    /// Executor records by address
    pub executors: HashMap<Address, Executor>,
    /// Latest commitment per address
    pub commits: HashMap<Address, CommitData>,
    pub active: ActiveSet,
    pub pools: PoolBalances,
    pub epoch: u64,
    pub epoch_end_time: u64,
    /// Running randomness accumulator
    pub seed: Hash,
    /// Designated executors that checked in this epoch, in check-in order
    pub pool_cut_receivers: Vec<Address>,
    /// Module catalog; a module's id is its position
    pub modules: Vec<String>,
    pub job_registries: Vec<Arc<dyn JobRegistry>>,
    /// Events to be drained by the host
    pub pending_events: Vec<CoordinatorEvent>,
}

impl CoordinatorState {
    pub fn new(epoch: u64, epoch_end_time: u64, seed: Hash) -> Self {
        Self {
            executors: HashMap::new(),
            commits: HashMap::new(),
            active: ActiveSet::new(),
            pools: PoolBalances::default(),
            epoch,
            epoch_end_time,
            seed,
            pool_cut_receivers: Vec::new(),
            modules: Vec::new(),
            job_registries: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Bits of every module currently in the catalog.
    pub fn valid_modules(&self) -> ModuleSet {
        ModuleSet::first_n(self.modules.len())
    }

    /// Initialized executor record for `address`.
    pub fn initialized(&self, address: &Address) -> Option<&Executor> {
        self.executors.get(address).filter(|e| e.initialized)
    }

    pub fn initialized_mut(&mut self, address: &Address) -> Option<&mut Executor> {
        self.executors.get_mut(address).filter(|e| e.initialized)
    }

    /// Insert `address` into the active set and flag it active.
    pub fn activate(&mut self, address: Address) {
        let index = self.active.activate(address);
        if let Some(executor) = self.executors.get_mut(&address) {
            executor.active = true;
            executor.array_index = index;
        }
        info!(
            "[qc-18] executor {} activated at index {}",
            hex::encode(address),
            index
        );
        self.pending_events.push(CoordinatorEvent::ExecutorActivated {
            executor: address,
            array_index: index,
        });
    }

    /// Swap-delete `address` out of the active set.
    pub fn deactivate(&mut self, address: Address, reason: DeactivationReason) {
        let Some(executor) = self.executors.get_mut(&address) else {
            return;
        };
        if !executor.active {
            return;
        }
        executor.active = false;
        let index = executor.array_index;

        if let Some(relocation) = self.active.deactivate(index) {
            if let Some(moved) = self.executors.get_mut(&relocation.address) {
                moved.array_index = relocation.new_index;
            }
        }
        info!(
            "[qc-18] executor {} deactivated ({:?})",
            hex::encode(address),
            reason
        );
        self.pending_events.push(CoordinatorEvent::ExecutorDeactivated {
            executor: address,
            reason,
        });
    }

    /// Deactivate `address` if its balance fell below the per-module
    /// threshold.
    pub fn enforce_threshold(&mut self, address: Address, threshold_per_module: u128) {
        let below = self
            .executors
            .get(&address)
            .map(|e| e.active && e.balance < e.per_module_amount(threshold_per_module))
            .unwrap_or(false);
        if below {
            self.deactivate(address, DeactivationReason::BelowThreshold);
        }
    }

    pub fn check_invariants(&self, custodied: u128) -> Result<(), InvariantViolation> {
        check_conservation(&self.executors, &self.pools, custodied)?;
        check_no_gaps(&self.active, &self.executors)?;
        check_module_floor(&self.executors)
    }
}
