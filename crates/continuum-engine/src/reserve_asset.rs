//! The external reserve-asset ledger.
//!
//! The engine never holds reserve itself; it moves it on an asset ledger
//! with ERC-20-style allowance semantics. Transfers report success as a
//! plain `bool` and the engine turns a refusal into `TransferFailed`.

use std::collections::HashMap;

use continuum_types::{AccountId, U256};
use tracing::debug;

pub trait ReserveAsset {
    /// Pull `amount` from `from` into `to`, spending `from`'s allowance
    /// to `to`.
    fn transfer_in(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool;

    /// Push `amount` from `from` (the engine's custody) to `to`.
    fn transfer_out(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool;

    fn allowance(&self, owner: AccountId, spender: AccountId) -> U256;

    fn balance_of(&self, account: AccountId) -> U256;
}

/// Balances and allowances kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReserveAsset {
    balances: HashMap<AccountId, U256>,
    allowances: HashMap<(AccountId, AccountId), U256>,
    total_supply: U256,
}

impl InMemoryReserveAsset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` out of thin air for `account`. Returns `false` on
    /// supply overflow.
    pub fn mint_to(&mut self, account: AccountId, amount: U256) -> bool {
        let Some(total) = self.total_supply.checked_add(amount) else {
            return false;
        };
        self.total_supply = total;
        let balance = self.balance_of(account) + amount;
        self.balances.insert(account, balance);
        true
    }

    /// Set `spender`'s allowance over `owner`'s balance.
    pub fn approve(&mut self, owner: AccountId, spender: AccountId, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Plain holder-to-holder transfer.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool {
        let have = self.balance_of(from);
        if have < amount {
            debug!(from = %from, need = %amount, have = %have, "reserve transfer refused");
            return false;
        }
        if from != to {
            self.balances.insert(from, have - amount);
            let credited = self.balance_of(to) + amount;
            self.balances.insert(to, credited);
        }
        true
    }

    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }
}

impl ReserveAsset for InMemoryReserveAsset {
    fn transfer_in(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool {
        let allowed = self.allowance(from, to);
        if allowed < amount {
            debug!(owner = %from, spender = %to, need = %amount, allowed = %allowed, "allowance too low");
            return false;
        }
        if !self.transfer(from, to, amount) {
            return false;
        }
        self.allowances.insert((from, to), allowed - amount);
        true
    }

    fn transfer_out(&mut self, from: AccountId, to: AccountId, amount: U256) -> bool {
        self.transfer(from, to, amount)
    }

    fn allowance(&self, owner: AccountId, spender: AccountId) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_else(U256::zero)
    }

    fn balance_of(&self, account: AccountId) -> U256 {
        self.balances
            .get(&account)
            .copied()
            .unwrap_or_else(U256::zero)
    }
}
