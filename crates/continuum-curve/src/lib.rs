//! # continuum-curve
//!
//! **Pure deterministic bonding-curve math for Continuum.**
//!
//! The curve crate is the pricing plane: it takes a curve state and an
//! amount and returns how much the other side receives. It has:
//!
//! - **Zero side effects**: no balances, no clocks, no transfers
//! - **Deterministic output**: integer-only arithmetic, same result on every node
//! - **Engine-favouring rounding**: every step floors, round trips never profit
//! - **Graceful precision**: exponentiation drops precision instead of overflowing

pub mod bonding_curve;
pub mod power;

pub use bonding_curve::{purchase_amount, quote_purchase, quote_sale, sale_amount, spot_price};
pub use power::{MAX_EXP_ARRAY, power};
