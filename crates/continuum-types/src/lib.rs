//! # continuum-types
//!
//! Shared types, errors, and configuration for the **Continuum**
//! continuous-token engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Integers**: [`U256`], [`U512`], [`mul_div`], amount serde helpers
//! - **Identifiers**: [`AccountId`], [`EscrowId`]
//! - **Curve model**: [`CurveState`]
//! - **Audit model**: [`MintEvent`], [`BurnEvent`], [`EngineEvent`], [`RecordedEvent`]
//! - **Configuration**: [`EngineConfig`], [`EscrowConfig`]
//! - **Errors**: [`ContinuumError`] with `CT_ERR_` prefix codes
//! - **Constants**: curve scales and defaults

pub mod config;
pub mod constants;
pub mod curve;
pub mod error;
pub mod event;
pub mod ids;
pub mod num;

// Re-export all primary types at crate root for ergonomic imports:
//   use continuum_types::{U256, AccountId, CurveState, ...};

pub use config::*;
pub use curve::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use num::*;

// Constants are accessed via `continuum_types::constants::FOO`
// (not re-exported to avoid name collisions).
