//! Two-step ownership handoff.
//!
//! The current owner nominates a successor; nothing changes until the
//! successor accepts. A mistyped address therefore cannot strand the
//! privileged operations it gates.

use continuum_types::{AccountId, ContinuumError, Result};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Ownership {
    owner: AccountId,
    pending: Option<AccountId>,
}

impl Ownership {
    #[must_use]
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            pending: None,
        }
    }

    #[must_use]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    #[must_use]
    pub fn pending_owner(&self) -> Option<AccountId> {
        self.pending
    }

    /// # Errors
    /// `NotOwner` if `caller` is not the current owner.
    pub fn ensure_owner(&self, caller: AccountId) -> Result<()> {
        if caller == self.owner {
            Ok(())
        } else {
            warn!(caller = %caller, owner = %self.owner, "owner-only call rejected");
            Err(ContinuumError::NotOwner(caller))
        }
    }

    /// Nominate `new_owner`. Replaces any earlier nomination.
    pub fn transfer_ownership(&mut self, caller: AccountId, new_owner: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(ContinuumError::invalid_amount(
                "new owner must be a non-zero account",
            ));
        }
        self.pending = Some(new_owner);
        info!(owner = %self.owner, pending = %new_owner, "ownership transfer started");
        Ok(())
    }

    /// Complete the handoff. Returns the previous owner.
    ///
    /// # Errors
    /// `NotPendingOwner` unless `caller` is the nominated successor.
    pub fn accept_ownership(&mut self, caller: AccountId) -> Result<AccountId> {
        if self.pending != Some(caller) {
            warn!(caller = %caller, "ownership accept by non-nominee rejected");
            return Err(ContinuumError::NotPendingOwner(caller));
        }
        let previous = self.owner;
        self.owner = caller;
        self.pending = None;
        info!(previous = %previous, owner = %caller, "ownership transferred");
        Ok(previous)
    }

    /// Withdraw a pending nomination.
    pub fn cancel_transfer(&mut self, caller: AccountId) -> Result<()> {
        self.ensure_owner(caller)?;
        self.pending = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> AccountId {
        AccountId::from_label("alice")
    }

    fn bob() -> AccountId {
        AccountId::from_label("bob")
    }

    #[test]
    fn handoff_requires_acceptance() {
        let mut own = Ownership::new(alice());
        own.transfer_ownership(alice(), bob()).unwrap();
        assert_eq!(own.owner(), alice());
        assert_eq!(own.pending_owner(), Some(bob()));

        assert_eq!(own.accept_ownership(bob()).unwrap(), alice());
        assert_eq!(own.owner(), bob());
        assert_eq!(own.pending_owner(), None);
        assert!(own.ensure_owner(alice()).is_err());
        own.ensure_owner(bob()).unwrap();
    }

    #[test]
    fn only_owner_may_nominate() {
        let mut own = Ownership::new(alice());
        let err = own.transfer_ownership(bob(), bob()).unwrap_err();
        assert!(matches!(err, ContinuumError::NotOwner(a) if a == bob()));
        assert_eq!(own.pending_owner(), None);
    }

    #[test]
    fn only_nominee_may_accept() {
        let mut own = Ownership::new(alice());
        let carol = AccountId::from_label("carol");
        own.transfer_ownership(alice(), bob()).unwrap();
        let err = own.accept_ownership(carol).unwrap_err();
        assert!(matches!(err, ContinuumError::NotPendingOwner(_)));
        assert_eq!(own.owner(), alice());

        // No nomination at all.
        let mut fresh = Ownership::new(alice());
        assert!(fresh.accept_ownership(alice()).is_err());
    }

    #[test]
    fn cancel_clears_nomination() {
        let mut own = Ownership::new(alice());
        own.transfer_ownership(alice(), bob()).unwrap();
        own.cancel_transfer(alice()).unwrap();
        assert!(own.accept_ownership(bob()).is_err());
    }

    #[test]
    fn zero_account_cannot_be_nominated() {
        let mut own = Ownership::new(alice());
        assert!(own.transfer_ownership(alice(), AccountId::ZERO).is_err());
    }
}
