//! In-memory holder balances of the derivative asset.
//!
//! The engine credits on mint and debits on burn; holders move balances
//! between themselves with [`DerivativeLedger::transfer`]. `total_issued`
//! always equals the sum of all balances.

use std::collections::HashMap;

use continuum_types::{AccountId, ContinuumError, Result, U256};

#[derive(Debug, Clone, Default)]
pub struct DerivativeLedger {
    balances: HashMap<AccountId, U256>,
    total_issued: U256,
}

impl DerivativeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`. Zero if absent.
    #[must_use]
    pub fn balance_of(&self, account: &AccountId) -> U256 {
        self.balances
            .get(account)
            .copied()
            .unwrap_or_else(U256::zero)
    }

    #[must_use]
    pub fn total_issued(&self) -> U256 {
        self.total_issued
    }

    /// Number of accounts with a non-zero balance.
    #[must_use]
    pub fn holders(&self) -> usize {
        self.balances.len()
    }

    /// Issue `amount` to `account`.
    ///
    /// # Errors
    /// - `InvalidAmount` if amount is zero
    /// - `ArithmeticOverflow` if the total would exceed 256 bits
    pub fn credit(&mut self, account: AccountId, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Err(ContinuumError::invalid_amount(
                "credit amount must be positive",
            ));
        }
        let total = self
            .total_issued
            .checked_add(amount)
            .ok_or(ContinuumError::ArithmeticOverflow {
                context: "derivative supply",
            })?;
        // Individual balances are bounded by the total.
        let balance = self.balance_of(&account) + amount;
        self.balances.insert(account, balance);
        self.total_issued = total;
        Ok(())
    }

    /// Retire `amount` from `account`.
    ///
    /// # Errors
    /// - `InvalidAmount` if amount is zero
    /// - `InsufficientBalance` if the account holds less than `amount`
    pub fn debit(&mut self, account: AccountId, amount: U256) -> Result<()> {
        self.ensure_balance(&account, amount)?;
        self.set_balance(account, self.balance_of(&account) - amount);
        self.total_issued = self.total_issued - amount;
        Ok(())
    }

    /// Move `amount` between holders. Total issuance is unchanged.
    ///
    /// # Errors
    /// Same as [`DerivativeLedger::debit`].
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: U256) -> Result<()> {
        self.ensure_balance(&from, amount)?;
        if from == to {
            return Ok(());
        }
        self.set_balance(from, self.balance_of(&from) - amount);
        let credited = self.balance_of(&to) + amount;
        self.balances.insert(to, credited);
        Ok(())
    }

    fn ensure_balance(&self, account: &AccountId, amount: U256) -> Result<()> {
        if amount.is_zero() {
            return Err(ContinuumError::invalid_amount("amount must be positive"));
        }
        let available = self.balance_of(account);
        if available < amount {
            return Err(ContinuumError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn set_balance(&mut self, account: AccountId, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }
}
