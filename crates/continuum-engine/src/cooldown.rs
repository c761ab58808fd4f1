//! Mint-to-burn dwell time.
//!
//! A freshly minted position cannot be burned until the cooldown has
//! elapsed since the account's last mint. This blocks the back-run leg of
//! a single-account sandwich: mint just before a large mint, burn just
//! after at the raised price.
//!
//! Records are written only by the account's own mints, overwritten on
//! every mint and never deleted.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use continuum_types::{AccountId, ContinuumError, Result};

#[derive(Debug, Clone, Default)]
pub struct CooldownGuard {
    last_mint: HashMap<AccountId, DateTime<Utc>>,
}

impl CooldownGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the account's last mint time.
    pub fn record_mint(&mut self, account: AccountId, now: DateTime<Utc>) {
        self.last_mint.insert(account, now);
    }

    #[must_use]
    pub fn last_mint_at(&self, account: &AccountId) -> Option<DateTime<Utc>> {
        self.last_mint.get(account).copied()
    }

    /// Earliest time the account may burn, if it ever minted.
    ///
    /// An unrepresentable sum saturates to the end of time.
    #[must_use]
    pub fn ready_at(&self, account: &AccountId, cooldown: Duration) -> Option<DateTime<Utc>> {
        self.last_mint_at(account).map(|last| {
            last.checked_add_signed(cooldown)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }

    /// # Errors
    /// `CooldownActive` if `now` is before `last_mint + cooldown`.
    pub fn check_burn_allowed(
        &self,
        account: AccountId,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<()> {
        match self.ready_at(&account, cooldown) {
            Some(ready_at) if now < ready_at => {
                Err(ContinuumError::CooldownActive { account, ready_at })
            }
            _ => Ok(()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.last_mint.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.last_mint.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    fn cooldown() -> Duration {
        Duration::minutes(15)
    }

    #[test]
    fn unknown_account_may_burn() {
        let guard = CooldownGuard::new();
        guard
            .check_burn_allowed(AccountId::from_label("fresh"), at(0), cooldown())
            .unwrap();
        assert!(guard.is_empty());
    }

    #[test]
    fn burn_blocked_until_cooldown_elapses() {
        let mut guard = CooldownGuard::new();
        let alice = AccountId::from_label("alice");
        guard.record_mint(alice, at(0));

        for secs in [0, 1, 899] {
            let err = guard
                .check_burn_allowed(alice, at(secs), cooldown())
                .unwrap_err();
            assert!(
                matches!(err, ContinuumError::CooldownActive { ready_at, .. } if ready_at == at(900))
            );
        }
        guard.check_burn_allowed(alice, at(900), cooldown()).unwrap();
        guard.check_burn_allowed(alice, at(5_000), cooldown()).unwrap();
    }

    #[test]
    fn new_mint_restarts_cooldown() {
        let mut guard = CooldownGuard::new();
        let alice = AccountId::from_label("alice");
        guard.record_mint(alice, at(0));
        guard.record_mint(alice, at(600));
        assert!(guard.check_burn_allowed(alice, at(1_000), cooldown()).is_err());
        guard.check_burn_allowed(alice, at(1_500), cooldown()).unwrap();
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn zero_cooldown_never_blocks() {
        let mut guard = CooldownGuard::new();
        let alice = AccountId::from_label("alice");
        guard.record_mint(alice, at(0));
        guard.check_burn_allowed(alice, at(0), Duration::zero()).unwrap();
    }

    #[test]
    fn huge_cooldown_saturates() {
        let mut guard = CooldownGuard::new();
        let alice = AccountId::from_label("alice");
        guard.record_mint(alice, at(0));
        assert_eq!(
            guard.ready_at(&alice, Duration::MAX),
            Some(DateTime::<Utc>::MAX_UTC)
        );
        assert!(guard.check_burn_allowed(alice, at(1_000_000), Duration::MAX).is_err());
    }
}
