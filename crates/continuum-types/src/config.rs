//! Configuration types for Continuum engines and escrows.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{AccountId, ContinuumError, Result, U256, amount_serde, constants, validate_reserve_ratio};

/// Configuration for a single continuous-token engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Curve shape in parts-per-million (1..=1_000_000).
    pub reserve_ratio_ppm: u32,
    /// Minimum dwell time between an account's mint and its next burn.
    pub cooldown_secs: u64,
    /// Derivative supply seeded at deployment, credited to `owner`.
    #[serde(with = "amount_serde")]
    pub initial_supply: U256,
    /// Reserve balance seeded at deployment.
    #[serde(with = "amount_serde")]
    pub initial_reserve: U256,
    /// Account allowed to change parameters and manage the denylist.
    pub owner: AccountId,
    /// The engine's own custody account on the reserve-asset ledger.
    pub custody: AccountId,
    /// Single account allowed to force transfers between holders.
    pub override_authority: AccountId,
}

impl EngineConfig {
    /// Linear-curve config with the default cooldown.
    #[must_use]
    pub fn linear(
        initial_supply: U256,
        initial_reserve: U256,
        owner: AccountId,
        custody: AccountId,
    ) -> Self {
        Self {
            reserve_ratio_ppm: constants::DEFAULT_RESERVE_RATIO_PPM,
            cooldown_secs: constants::DEFAULT_COOLDOWN_SECS,
            initial_supply,
            initial_reserve,
            owner,
            custody,
            override_authority: owner,
        }
    }

    /// Parse a JSON config and validate it.
    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configs the engine cannot be seeded from.
    pub fn validate(&self) -> Result<()> {
        validate_reserve_ratio(self.reserve_ratio_ppm)
            .map_err(|e| ContinuumError::Configuration(e.to_string()))?;
        if self.initial_supply.is_zero() {
            return Err(ContinuumError::Configuration(
                "initial_supply must be positive".into(),
            ));
        }
        if self.initial_reserve.is_zero() {
            return Err(ContinuumError::Configuration(
                "initial_reserve must be positive".into(),
            ));
        }
        if self.owner.is_zero() || self.custody.is_zero() {
            return Err(ContinuumError::Configuration(
                "owner and custody must be non-zero accounts".into(),
            ));
        }
        if self.owner == self.custody {
            return Err(ContinuumError::Configuration(
                "custody account must differ from owner".into(),
            ));
        }
        if i64::try_from(self.cooldown_secs).is_err() {
            return Err(ContinuumError::Configuration(format!(
                "cooldown_secs {} out of range",
                self.cooldown_secs
            )));
        }
        Ok(())
    }

    /// Cooldown as a `chrono::Duration`. Saturates on absurd values.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        secs_to_duration(self.cooldown_secs)
    }
}

/// Configuration for a time-locked escrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// How long deposits stay locked before the beneficiary may release.
    pub lock_duration_secs: u64,
    /// The escrow's custody account on the escrowed asset's ledger.
    pub custody: AccountId,
}

impl EscrowConfig {
    #[must_use]
    pub fn new(custody: AccountId) -> Self {
        Self {
            lock_duration_secs: constants::DEFAULT_ESCROW_LOCK_SECS,
            custody,
        }
    }

    #[must_use]
    pub fn lock_duration(&self) -> Duration {
        secs_to_duration(self.lock_duration_secs)
    }
}

fn secs_to_duration(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
