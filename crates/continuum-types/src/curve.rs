//! Bonding-curve state.
//!
//! `total_supply` and `reserve_balance` move together: a mint grows both,
//! a burn shrinks both. Neither may ever reach zero because the curve
//! formula is undefined there.

use serde::{Deserialize, Serialize};

use crate::{ContinuumError, Result, U256, amount_serde, constants};

/// Supply, reserve, and curve shape of one engine instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurveState {
    /// Circulating derivative supply (base units).
    #[serde(with = "amount_serde")]
    pub total_supply: U256,
    /// Reserve held by the engine (base units).
    #[serde(with = "amount_serde")]
    pub reserve_balance: U256,
    /// Curve shape in parts-per-million. Immutable after construction.
    pub reserve_ratio_ppm: u32,
}

impl CurveState {
    /// Create a seeded curve state.
    ///
    /// # Errors
    /// - `InvalidReserveRatio` if the ratio is outside `1..=1_000_000`
    /// - `CurveInvariantViolation` if supply or reserve is zero
    pub fn new(total_supply: U256, reserve_balance: U256, reserve_ratio_ppm: u32) -> Result<Self> {
        validate_reserve_ratio(reserve_ratio_ppm)?;
        let state = Self {
            total_supply,
            reserve_balance,
            reserve_ratio_ppm,
        };
        state.check_invariants()?;
        Ok(state)
    }

    /// Both supply and reserve must stay at least one base unit.
    pub fn check_invariants(&self) -> Result<()> {
        if self.total_supply.is_zero() {
            return Err(ContinuumError::CurveInvariantViolation {
                reason: "total supply would reach zero".into(),
            });
        }
        if self.reserve_balance.is_zero() {
            return Err(ContinuumError::CurveInvariantViolation {
                reason: "reserve balance would reach zero".into(),
            });
        }
        Ok(())
    }

    /// Whether the ratio describes the linear price/supply curve.
    #[must_use]
    pub fn is_linear(&self) -> bool {
        self.reserve_ratio_ppm == constants::LINEAR_RESERVE_RATIO_PPM
    }
}

/// Reject ratios outside `1..=MAX_RESERVE_RATIO_PPM`.
pub fn validate_reserve_ratio(reserve_ratio_ppm: u32) -> Result<()> {
    if reserve_ratio_ppm == 0 || reserve_ratio_ppm > constants::MAX_RESERVE_RATIO_PPM {
        return Err(ContinuumError::InvalidReserveRatio(reserve_ratio_ppm));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens;

    #[test]
    fn new_accepts_seeded_state() {
        let state = CurveState::new(tokens(10), tokens(10), 500_000).unwrap();
        assert!(state.is_linear());
        assert_eq!(state.total_supply, tokens(10));
    }

    #[test]
    fn new_rejects_bad_ratio() {
        for ratio in [0, 1_000_001, u32::MAX] {
            let err = CurveState::new(tokens(1), tokens(1), ratio).unwrap_err();
            assert!(matches!(err, ContinuumError::InvalidReserveRatio(r) if r == ratio));
        }
        assert!(CurveState::new(tokens(1), tokens(1), 1).is_ok());
        assert!(CurveState::new(tokens(1), tokens(1), 1_000_000).is_ok());
    }

    #[test]
    fn new_rejects_empty_seed() {
        let err = CurveState::new(U256::zero(), tokens(1), 500_000).unwrap_err();
        assert!(matches!(err, ContinuumError::CurveInvariantViolation { .. }));
        let err = CurveState::new(tokens(1), U256::zero(), 500_000).unwrap_err();
        assert!(matches!(err, ContinuumError::CurveInvariantViolation { .. }));
    }

    #[test]
    fn curve_state_serde_roundtrip() {
        let state = CurveState::new(tokens(10), tokens(25), 333_333).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"25000000000000000000\""));
        let back: CurveState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
