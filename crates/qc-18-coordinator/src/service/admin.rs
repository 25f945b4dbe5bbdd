//! # Owner Operations

use super::*;
use crate::domain::ModuleId;
use crate::ports::outbound::JobRegistry;

/// Module ids are a single byte.
const MAX_MODULES: usize = ModuleId::MAX as usize + 1;

impl<L, C> Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    /// Append `name` to the module catalog and return its id.
    pub fn add_module(&self, caller: Address, name: &str) -> CoordinatorResult<ModuleId> {
        self.require_owner(&caller)?;
        self.transact("add_module", |state, _| {
            if state.modules.len() >= MAX_MODULES {
                return Err(CoordinatorError::ModuleCatalogFull);
            }
            let id = state.modules.len() as ModuleId;
            state.modules.push(name.to_string());
            info!("[qc-18] module {} added as id {}", name, id);
            Ok(id)
        })
    }

    /// Attach a job registry and return the index `execute_batch` uses
    /// for it.
    pub fn add_job_registry(
        &self,
        caller: Address,
        registry: Arc<dyn JobRegistry>,
    ) -> CoordinatorResult<usize> {
        self.require_owner(&caller)?;
        self.transact("add_job_registry", |state, _| {
            state.job_registries.push(registry);
            let index = state.job_registries.len() - 1;
            info!("[qc-18] job registry attached at index {}", index);
            Ok(index)
        })
    }

    pub(super) fn apply_withdraw_protocol_balance(
        &self,
        state: &mut CoordinatorState,
        caller: Address,
        recipient: Address,
    ) -> CoordinatorResult<u128> {
        self.require_owner(&caller)?;

        let amount = std::mem::take(&mut state.pools.protocol);
        state
            .pending_events
            .push(CoordinatorEvent::ProtocolBalanceWithdrawn { recipient, amount });
        if amount > 0 {
            self.ledger.transfer(&self.custody, &recipient, amount)?;
        }

        info!(
            "[qc-18] protocol balance {} withdrawn to {}",
            amount,
            hex::encode(recipient)
        );
        Ok(amount)
    }
}
