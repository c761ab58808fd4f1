//! Address denylist.
//!
//! Flagged accounts can neither send nor receive. Gating who may edit the
//! list is the embedding component's job.

use std::collections::HashSet;

use continuum_types::{AccountId, ContinuumError, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct Denylist {
    banned: HashSet<AccountId>,
}

impl Denylist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag `account`. Returns `false` if it was already flagged.
    pub fn ban(&mut self, account: AccountId) -> bool {
        let added = self.banned.insert(account);
        if added {
            info!(account = %account, "account banned");
        }
        added
    }

    /// Clear `account`. Returns `false` if it was not flagged.
    pub fn unban(&mut self, account: AccountId) -> bool {
        let removed = self.banned.remove(&account);
        if removed {
            info!(account = %account, "account unbanned");
        }
        removed
    }

    #[must_use]
    pub fn is_banned(&self, account: &AccountId) -> bool {
        self.banned.contains(account)
    }

    /// # Errors
    /// `AccountBanned` if `account` is flagged.
    pub fn ensure_allowed(&self, account: AccountId) -> Result<()> {
        if self.is_banned(&account) {
            warn!(account = %account, "banned account rejected");
            return Err(ContinuumError::AccountBanned(account));
        }
        Ok(())
    }

    /// Both sides of a transfer must be clear. The sender is checked first.
    pub fn ensure_transfer_allowed(&self, from: AccountId, to: AccountId) -> Result<()> {
        self.ensure_allowed(from)?;
        self.ensure_allowed(to)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.banned.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.banned.is_empty()
    }
}
