//! # Domain Invariants
//!
//! Properties that must hold between operations:
//! - Conservation: executor balances plus the three pots equal custodied funds
//! - No gaps: `[0, n)` of the active set are active executors at their own index
//! - Module floor: initialized executors register at least two modules

use super::active_set::ActiveSet;
use super::executor::Executor;
use super::pools::PoolBalances;
use super::value_objects::{Address, MIN_REGISTERED_MODULES};
use std::collections::HashMap;

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    Conservation { accounted: u128, custodied: u128 },
    ActiveSlotMismatch { index: usize },
    InactiveExecutorInSet { index: usize },
    ActiveExecutorMissing { address: Address },
    TooFewModules { address: Address, count: u32 },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conservation {
                accounted,
                custodied,
            } => write!(
                f,
                "conservation broken: accounted {accounted} != custodied {custodied}"
            ),
            Self::ActiveSlotMismatch { index } => {
                write!(f, "active slot {index} does not point back to its executor")
            }
            Self::InactiveExecutorInSet { index } => {
                write!(f, "active slot {index} holds an inactive executor")
            }
            Self::ActiveExecutorMissing { address } => {
                write!(f, "active executor {} not in active set", hex::encode(address))
            }
            Self::TooFewModules { address, count } => write!(
                f,
                "executor {} registers {count} modules",
                hex::encode(address)
            ),
        }
    }
}

/// Sum of every internal balance the coordinator owes.
pub fn accounted_funds(executors: &HashMap<Address, Executor>, pools: &PoolBalances) -> u128 {
    executors
        .values()
        .fold(pools.total(), |acc, e| acc.saturating_add(e.balance))
}

pub fn check_conservation(
    executors: &HashMap<Address, Executor>,
    pools: &PoolBalances,
    custodied: u128,
) -> Result<(), InvariantViolation> {
    let accounted = accounted_funds(executors, pools);
    if accounted != custodied {
        return Err(InvariantViolation::Conservation {
            accounted,
            custodied,
        });
    }
    Ok(())
}

pub fn check_no_gaps(
    active: &ActiveSet,
    executors: &HashMap<Address, Executor>,
) -> Result<(), InvariantViolation> {
    for (index, address) in active.as_slice().iter().enumerate() {
        match executors.get(address) {
            Some(e) if !e.active => return Err(InvariantViolation::InactiveExecutorInSet { index }),
            Some(e) if e.array_index == index => {}
            _ => return Err(InvariantViolation::ActiveSlotMismatch { index }),
        }
    }
    let active_count = executors.values().filter(|e| e.active).count();
    if active_count != active.len() {
        if let Some(missing) = executors
            .values()
            .find(|e| e.active && active.get(e.array_index) != Some(e.address))
        {
            return Err(InvariantViolation::ActiveExecutorMissing {
                address: missing.address,
            });
        }
    }
    Ok(())
}

pub fn check_module_floor(executors: &HashMap<Address, Executor>) -> Result<(), InvariantViolation> {
    match executors
        .values()
        .find(|e| e.initialized && e.module_count() < MIN_REGISTERED_MODULES)
    {
        Some(e) => Err(InvariantViolation::TooFewModules {
            address: e.address,
            count: e.module_count(),
        }),
        None => Ok(()),
    }
}
