//! Override-transfer authority.
//!
//! Exactly one account may force derivative transfers between holders
//! (court orders, key-loss recovery). The identity is stored and checked
//! at call time.

use continuum_types::{AccountId, ContinuumError, Result};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideAuthority {
    authority: AccountId,
}

impl OverrideAuthority {
    #[must_use]
    pub fn new(authority: AccountId) -> Self {
        Self { authority }
    }

    #[must_use]
    pub fn authority(&self) -> AccountId {
        self.authority
    }

    /// # Errors
    /// `NotAuthority` if `caller` is not the designated authority.
    pub fn ensure_authorized(&self, caller: AccountId) -> Result<()> {
        if caller == self.authority {
            return Ok(());
        }
        warn!(caller = %caller, "unauthorised override attempt");
        Err(ContinuumError::NotAuthority(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_authority_passes() {
        let regulator = AccountId::from_label("regulator");
        let auth = OverrideAuthority::new(regulator);
        auth.ensure_authorized(regulator).unwrap();
        assert_eq!(auth.authority(), regulator);

        let mallory = AccountId::from_label("mallory");
        let err = auth.ensure_authorized(mallory).unwrap_err();
        assert!(matches!(err, ContinuumError::NotAuthority(a) if a == mallory));
        assert_eq!(err.code(), "CT_ERR_503");
    }
}
