//! Error types for the Continuum engine.
//!
//! All errors use the `CT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Amount / balance errors
//! - 2xx: Curve arithmetic errors
//! - 3xx: Timing errors (cooldown, clock, escrow lock)
//! - 4xx: External transfer errors
//! - 5xx: Access-control errors
//! - 9xx: General / internal errors

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{AccountId, EscrowId, U256};

/// Central error enum for all Continuum operations.
#[derive(Debug, Error)]
pub enum ContinuumError {
    // =================================================================
    // Amount Errors (1xx)
    // =================================================================
    /// Zero or out-of-domain amount.
    #[error("CT_ERR_100: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Burn or transfer exceeds the caller's holdings.
    #[error("CT_ERR_101: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: U256, available: U256 },

    // =================================================================
    // Curve Errors (2xx)
    // =================================================================
    /// Fixed-point computation exceeded every precision fallback.
    #[error("CT_ERR_200: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// Reserve ratio outside 1..=1_000_000 ppm.
    #[error("CT_ERR_201: Invalid reserve ratio: {0} ppm")]
    InvalidReserveRatio(u32),

    /// An operation would drain supply or reserve to zero.
    #[error("CT_ERR_202: Curve invariant violation: {reason}")]
    CurveInvariantViolation { reason: String },

    /// Reserve balance no longer equals seed + deposits - withdrawals.
    #[error("CT_ERR_203: Reserve conservation violation: {reason}")]
    ReserveConservationViolation { reason: String },

    // =================================================================
    // Timing Errors (3xx)
    // =================================================================
    /// Burn attempted before the account's mint cooldown elapsed.
    #[error("CT_ERR_300: Cooldown active for {account} until {ready_at}")]
    CooldownActive {
        account: AccountId,
        ready_at: DateTime<Utc>,
    },

    /// The supplied clock went backwards.
    #[error("CT_ERR_301: Clock regression: {now} is earlier than {last_seen}")]
    ClockRegression {
        now: DateTime<Utc>,
        last_seen: DateTime<Utc>,
    },

    /// Escrow release attempted before its lock expired.
    #[error("CT_ERR_302: Escrow {id} locked until {release_at}")]
    EscrowLocked {
        id: EscrowId,
        release_at: DateTime<Utc>,
    },

    // =================================================================
    // Transfer Errors (4xx)
    // =================================================================
    /// An external asset-ledger call did not succeed.
    #[error("CT_ERR_400: Transfer failed: {reason}")]
    TransferFailed { reason: String },

    // =================================================================
    // Access-Control Errors (5xx)
    // =================================================================
    /// Caller is not the current owner.
    #[error("CT_ERR_500: Caller {0} is not the owner")]
    NotOwner(AccountId),

    /// Caller is not the pending owner of an ownership handoff.
    #[error("CT_ERR_501: Caller {0} is not the pending owner")]
    NotPendingOwner(AccountId),

    /// The account is on the denylist.
    #[error("CT_ERR_502: Account {0} is banned")]
    AccountBanned(AccountId),

    /// Caller is not the designated override authority.
    #[error("CT_ERR_503: Caller {0} is not the override authority")]
    NotAuthority(AccountId),

    /// Caller is not the escrow's beneficiary.
    #[error("CT_ERR_504: Caller {caller} is not the beneficiary of {id}")]
    NotBeneficiary { id: EscrowId, caller: AccountId },

    /// A guarded call was entered while already in progress.
    #[error("CT_ERR_505: Reentrant call rejected")]
    ReentrantCall,

    /// No escrow with this ID exists.
    #[error("CT_ERR_506: Escrow not found: {0}")]
    EscrowNotFound(EscrowId),

    /// The escrow has already been released.
    #[error("CT_ERR_507: Escrow already released: {0}")]
    EscrowAlreadyReleased(EscrowId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("CT_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("CT_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, out-of-range fields, etc.).
    #[error("CT_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl ContinuumError {
    /// Stable machine-matchable code, e.g. `"CT_ERR_300"`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount { .. } => "CT_ERR_100",
            Self::InsufficientBalance { .. } => "CT_ERR_101",
            Self::ArithmeticOverflow { .. } => "CT_ERR_200",
            Self::InvalidReserveRatio(_) => "CT_ERR_201",
            Self::CurveInvariantViolation { .. } => "CT_ERR_202",
            Self::ReserveConservationViolation { .. } => "CT_ERR_203",
            Self::CooldownActive { .. } => "CT_ERR_300",
            Self::ClockRegression { .. } => "CT_ERR_301",
            Self::EscrowLocked { .. } => "CT_ERR_302",
            Self::TransferFailed { .. } => "CT_ERR_400",
            Self::NotOwner(_) => "CT_ERR_500",
            Self::NotPendingOwner(_) => "CT_ERR_501",
            Self::AccountBanned(_) => "CT_ERR_502",
            Self::NotAuthority(_) => "CT_ERR_503",
            Self::NotBeneficiary { .. } => "CT_ERR_504",
            Self::ReentrantCall => "CT_ERR_505",
            Self::EscrowNotFound(_) => "CT_ERR_506",
            Self::EscrowAlreadyReleased(_) => "CT_ERR_507",
            Self::Internal(_) => "CT_ERR_900",
            Self::Serialization(_) => "CT_ERR_901",
            Self::Configuration(_) => "CT_ERR_902",
        }
    }

    /// Shorthand for [`ContinuumError::InvalidAmount`].
    #[must_use]
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`ContinuumError::TransferFailed`].
    #[must_use]
    pub fn transfer_failed(reason: impl Into<String>) -> Self {
        Self::TransferFailed {
            reason: reason.into(),
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ContinuumError>;

impl From<serde_json::Error> for ContinuumError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
