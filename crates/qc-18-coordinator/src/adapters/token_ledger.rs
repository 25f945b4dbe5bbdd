//! Token Ledger Adapter
//!
//! Implements the `TokenLedger` port with in-memory balances and allowances.

use crate::domain::Address;
use crate::error::TokenError;
use crate::ports::outbound::TokenLedger;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// In-memory fungible token for testing and simulation.
pub struct InMemoryTokenLedger {
    balances: RwLock<HashMap<Address, u128>>,
    /// (owner, spender) -> remaining allowance
    allowances: RwLock<HashMap<(Address, Address), u128>>,
    /// When set, every transfer is refused.
    rejecting: RwLock<Option<String>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            allowances: RwLock::new(HashMap::new()),
            rejecting: RwLock::new(None),
        }
    }

    /// Credit `amount` to `owner` out of thin air.
    pub fn mint(&self, owner: Address, amount: u128) {
        let mut balances = self.balances.write();
        let balance = balances.entry(owner).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Let `spender` move up to `amount` of `owner`'s tokens.
    pub fn approve(&self, owner: Address, spender: Address, amount: u128) {
        self.allowances.write().insert((owner, spender), amount);
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .read()
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    /// Refuse all transfers with `reason` until cleared with `None`.
    pub fn set_rejecting(&self, reason: Option<&str>) {
        *self.rejecting.write() = reason.map(str::to_string);
    }

    fn check_accepting(&self) -> Result<(), TokenError> {
        match self.rejecting.read().as_ref() {
            Some(reason) => Err(TokenError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }

    fn move_balance(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        let mut balances = self.balances.write();
        let have = balances.get(from).copied().unwrap_or(0);
        if have < amount {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }
        balances.insert(*from, have - amount);
        let to_balance = balances.entry(*to).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);
        Ok(())
    }
}

impl Default for InMemoryTokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TokenError> {
        self.check_accepting()?;
        self.move_balance(from, to, amount)?;
        debug!(
            "[qc-18] token transfer {} -> {}: {}",
            hex::encode(from),
            hex::encode(to),
            amount
        );
        Ok(())
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TokenError> {
        self.check_accepting()?;

        let allowed = self.allowance(from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances
            .write()
            .insert((*from, *spender), allowed - amount);

        debug!(
            "[qc-18] token transfer_from {} -> {}: {}",
            hex::encode(from),
            hex::encode(to),
            amount
        );
        Ok(())
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.balances.read().get(owner).copied().unwrap_or(0)
    }
}
