//! # continuum-engine
//!
//! **Stateful plane of Continuum**: the continuous-token engine and the
//! accounting around it.
//!
//! ## Architecture
//!
//! A mint flows through:
//! 1. Clock and denylist checks
//! 2. Curve quote (pure, [`continuum_curve`])
//! 3. Reserve pulled in from the depositor (before any mutation)
//! 4. [`ReserveLedger`] update
//! 5. [`CooldownGuard`] record
//! 6. [`DerivativeLedger`] credit
//! 7. [`EventLog`] append
//!
//! A burn runs the cooldown and balance checks first, commits the debit and
//! reserve update together, then pays the reserve out. A refused payout
//! restores the committed state.

pub mod audit;
pub mod cooldown;
pub mod derivative_ledger;
pub mod engine;
pub mod reserve_asset;
pub mod reserve_ledger;

pub use audit::{EventLog, compute_audit_root, verify_audit_root};
pub use cooldown::CooldownGuard;
pub use derivative_ledger::DerivativeLedger;
pub use engine::ContinuousTokenEngine;
pub use reserve_asset::{InMemoryReserveAsset, ReserveAsset};
pub use reserve_ledger::ReserveLedger;
