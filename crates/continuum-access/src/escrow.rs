//! Time-locked two-party escrow.
//!
//! A depositor locks an amount of some asset for a beneficiary. Once the
//! lock duration has elapsed the beneficiary, and only the beneficiary, may
//! release it, exactly once.
//!
//! Lifecycle:
//! - `Locked → Released` (beneficiary release after `release_at`)
//!
//! The escrow is shared by reference: its asset transfer may call back into
//! it, so state sits behind a `Mutex` and every entry point holds the
//! [`ReentrancyLock`] for its whole duration. The state mutex is never held
//! across an asset call.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Duration, Utc};
use continuum_types::{AccountId, ContinuumError, EscrowConfig, EscrowId, Result, U256};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::reentrancy::ReentrancyLock;

/// Ledger of the escrowed asset, with allowance semantics.
///
/// Errors from either transfer are reported as `TransferFailed`.
pub trait EscrowAsset: Send + Sync {
    /// Move `amount` from `from` to `to` on `from`'s own authority. The
    /// escrow only calls this to pay out of custody.
    fn transfer(&self, from: AccountId, to: AccountId, amount: U256) -> Result<()>;

    /// Pull `amount` from `from` into `to`, spending `from`'s allowance
    /// to `to`.
    fn transfer_from(&self, from: AccountId, to: AccountId, amount: U256) -> Result<()>;

    fn allowance(&self, owner: AccountId, spender: AccountId) -> U256;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowState {
    Locked,
    Released,
}

impl EscrowState {
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Locked, Self::Released))
    }
}

impl fmt::Display for EscrowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Released => write!(f, "RELEASED"),
        }
    }
}

/// One escrowed deposit.
#[derive(Clone)]
pub struct Escrow {
    pub id: EscrowId,
    pub asset: Arc<dyn EscrowAsset>,
    pub depositor: AccountId,
    pub beneficiary: AccountId,
    pub amount: U256,
    pub created_at: DateTime<Utc>,
    pub release_at: DateTime<Utc>,
    pub state: EscrowState,
}

impl fmt::Debug for Escrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Escrow")
            .field("id", &self.id)
            .field("depositor", &self.depositor)
            .field("beneficiary", &self.beneficiary)
            .field("amount", &self.amount)
            .field("created_at", &self.created_at)
            .field("release_at", &self.release_at)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Escrow {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == EscrowState::Locked
    }
}

pub struct TimelockEscrow {
    custody: AccountId,
    lock_duration: Duration,
    escrows: Mutex<HashMap<EscrowId, Escrow>>,
    guard: ReentrancyLock,
}

impl fmt::Debug for TimelockEscrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimelockEscrow")
            .field("custody", &self.custody)
            .field("lock_duration", &self.lock_duration)
            .finish_non_exhaustive()
    }
}

impl TimelockEscrow {
    #[must_use]
    pub fn new(config: &EscrowConfig) -> Self {
        Self {
            custody: config.custody,
            lock_duration: config.lock_duration(),
            escrows: Mutex::new(HashMap::new()),
            guard: ReentrancyLock::new(),
        }
    }

    /// The escrow's own account on every escrowed asset's ledger.
    #[must_use]
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    #[must_use]
    pub fn lock_duration(&self) -> Duration {
        self.lock_duration
    }

    /// Pull `amount` from `depositor` into custody and lock it for
    /// `beneficiary` until `now + lock_duration`.
    ///
    /// `depositor` must have approved the custody account for at least
    /// `amount` on `asset`.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero amount or zero beneficiary
    /// - `ReentrantCall` if invoked from inside an asset transfer
    /// - `TransferFailed` if the allowance is short or the asset refuses
    ///   the deposit
    pub fn create_escrow(
        &self,
        asset: Arc<dyn EscrowAsset>,
        depositor: AccountId,
        beneficiary: AccountId,
        amount: U256,
        now: DateTime<Utc>,
    ) -> Result<EscrowId> {
        let _entered = self.guard.enter()?;
        if amount.is_zero() {
            return Err(ContinuumError::invalid_amount(
                "escrow amount must be positive",
            ));
        }
        if beneficiary.is_zero() {
            return Err(ContinuumError::invalid_amount(
                "beneficiary must be a non-zero account",
            ));
        }
        let release_at = now
            .checked_add_signed(self.lock_duration)
            .ok_or(ContinuumError::ArithmeticOverflow {
                context: "escrow release time",
            })?;

        let allowance = asset.allowance(depositor, self.custody);
        if allowance < amount {
            warn!(depositor = %depositor, allowance = %allowance, amount = %amount, "escrow deposit without allowance rejected");
            return Err(ContinuumError::transfer_failed(format!(
                "allowance {allowance} below escrow amount {amount}"
            )));
        }
        asset
            .transfer_from(depositor, self.custody, amount)
            .map_err(|e| ContinuumError::transfer_failed(format!("escrow deposit: {e}")))?;

        let id = EscrowId::new();
        self.escrows()?.insert(
            id,
            Escrow {
                id,
                asset,
                depositor,
                beneficiary,
                amount,
                created_at: now,
                release_at,
                state: EscrowState::Locked,
            },
        );
        info!(
            escrow = %id,
            depositor = %depositor,
            beneficiary = %beneficiary,
            amount = %amount,
            release_at = %release_at,
            "escrow created"
        );
        Ok(id)
    }

    /// Pay the escrowed amount out to its beneficiary.
    ///
    /// The escrow is marked released before the asset is called and rolled
    /// back to locked if the transfer fails.
    ///
    /// # Errors
    /// - `ReentrantCall` if invoked from inside an asset transfer
    /// - `EscrowNotFound`, `NotBeneficiary`, `EscrowLocked`,
    ///   `EscrowAlreadyReleased` from the state checks
    /// - `TransferFailed` if the asset refuses the payout
    pub fn release(&self, id: EscrowId, caller: AccountId, now: DateTime<Utc>) -> Result<()> {
        let _entered = self.guard.enter()?;

        let (asset, beneficiary, amount) = {
            let mut escrows = self.escrows()?;
            let escrow = escrows
                .get_mut(&id)
                .ok_or(ContinuumError::EscrowNotFound(id))?;
            if caller != escrow.beneficiary {
                warn!(escrow = %id, caller = %caller, "release by non-beneficiary rejected");
                return Err(ContinuumError::NotBeneficiary { id, caller });
            }
            if !escrow.state.can_transition_to(EscrowState::Released) {
                return Err(ContinuumError::EscrowAlreadyReleased(id));
            }
            if now < escrow.release_at {
                return Err(ContinuumError::EscrowLocked {
                    id,
                    release_at: escrow.release_at,
                });
            }
            escrow.state = EscrowState::Released;
            (Arc::clone(&escrow.asset), escrow.beneficiary, escrow.amount)
        };

        if let Err(e) = asset.transfer(self.custody, beneficiary, amount) {
            if let Some(escrow) = self.escrows()?.get_mut(&id) {
                escrow.state = EscrowState::Locked;
            }
            warn!(escrow = %id, error = %e, "escrow payout refused");
            return Err(ContinuumError::transfer_failed(format!("escrow payout: {e}")));
        }

        info!(escrow = %id, beneficiary = %beneficiary, amount = %amount, "escrow released");
        Ok(())
    }

    /// Snapshot of one escrow.
    pub fn escrow(&self, id: EscrowId) -> Result<Option<Escrow>> {
        Ok(self.escrows()?.get(&id).cloned())
    }

    /// Number of escrows ever created.
    pub fn len(&self) -> Result<usize> {
        Ok(self.escrows()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.escrows()?.is_empty())
    }

    fn escrows(&self) -> Result<MutexGuard<'_, HashMap<EscrowId, Escrow>>> {
        self.escrows
            .lock()
            .map_err(|_| ContinuumError::Internal("escrow state lock poisoned".into()))
    }
}
