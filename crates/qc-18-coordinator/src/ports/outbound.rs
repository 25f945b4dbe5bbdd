//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Collaborators are invoked synchronously. Their failures surface as
//! errors and never leave coordination state half-applied.

use crate::domain::{Address, ModuleId};
use crate::error::{JobError, TokenError};
use serde::{Deserialize, Serialize};

/// Fungible token ledger holding the staking token.
pub trait TokenLedger: Send + Sync {
    /// Move `amount` owned by `from` to `to`.
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError>;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError>;

    fn balance_of(&self, owner: &Address) -> u128;
}

/// What a job registry reports back for one executed job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobExecution {
    pub creation_time: u64,
    pub fee: u128,
    pub fee_token: Address,
    pub execution_module: ModuleId,
    pub fee_module: ModuleId,
    /// Executed inside the job's zero-fee window
    pub in_zero_fee_window: bool,
}

/// Job definition owner. Executes one job per call.
///
/// Implementations must not call back into the coordinator; a same-thread
/// re-entry is rejected with `CoordinatorError::Reentrancy`.
pub trait JobRegistry: Send + Sync {
    fn execute(
        &self,
        index: u64,
        gas_limit: u64,
        fee_recipient: &Address,
    ) -> Result<JobExecution, JobError>;
}

/// Wall-clock source (unix seconds).
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}
