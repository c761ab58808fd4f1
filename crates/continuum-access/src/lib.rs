//! # continuum-access
//!
//! **Access-controlled ledger utilities for Continuum.**
//!
//! These collaborators share no state with the pricing engine. The engine
//! embeds [`Ownership`], [`Denylist`] and [`OverrideAuthority`] and consults
//! them at call time; [`TimelockEscrow`] stands on its own.
//!
//! - **Ownership**: two-step handoff, the new owner must accept
//! - **Denylist**: flagged accounts cannot send or receive
//! - **Override authority**: a single account allowed to force transfers
//! - **Timelock escrow**: beneficiary-only release after a fixed lock,
//!   guarded by a single-entry [`ReentrancyLock`]

pub mod denylist;
pub mod escrow;
pub mod ownership;
pub mod privileged;
pub mod reentrancy;

pub use denylist::Denylist;
pub use escrow::{Escrow, EscrowAsset, EscrowState, TimelockEscrow};
pub use ownership::Ownership;
pub use privileged::OverrideAuthority;
pub use reentrancy::{ReentrancyGuard, ReentrancyLock};
