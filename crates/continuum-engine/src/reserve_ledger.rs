//! Reserve accounting for one curve.
//!
//! Invariants enforced on every operation:
//! ```text
//! reserve_balance >= 1  and  total_supply >= 1
//! reserve_balance == initial_reserve + Σ(deposits) - Σ(withdrawals)
//! ```
//!
//! Each mutation is computed in full against a copy of the state and only
//! committed once every check has passed.

use continuum_curve::bonding_curve;
use continuum_types::{ContinuumError, CurveState, Result, U256};

fn overflow() -> ContinuumError {
    ContinuumError::ArithmeticOverflow {
        context: "reserve ledger",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveLedger {
    state: CurveState,
    /// Reserve seeded at construction.
    initial_reserve: U256,
    /// Reserve received by mints since construction.
    total_deposited: U256,
    /// Reserve paid out by burns since construction.
    total_withdrawn: U256,
}

impl ReserveLedger {
    #[must_use]
    pub fn new(state: CurveState) -> Self {
        Self {
            state,
            initial_reserve: state.reserve_balance,
            total_deposited: U256::zero(),
            total_withdrawn: U256::zero(),
        }
    }

    #[must_use]
    pub fn state(&self) -> CurveState {
        self.state
    }

    #[must_use]
    pub fn initial_reserve(&self) -> U256 {
        self.initial_reserve
    }

    #[must_use]
    pub fn total_deposited(&self) -> U256 {
        self.total_deposited
    }

    #[must_use]
    pub fn total_withdrawn(&self) -> U256 {
        self.total_withdrawn
    }

    /// Derivative a deposit would mint right now.
    pub fn quote_mint(&self, deposit: U256) -> Result<U256> {
        bonding_curve::quote_purchase(&self.state, deposit)
    }

    /// Reserve a burn would return right now.
    pub fn quote_burn(&self, burn: U256) -> Result<U256> {
        bonding_curve::quote_sale(&self.state, burn)
    }

    /// Take in `deposit` of reserve and mint against it.
    ///
    /// # Errors
    /// - `InvalidAmount` if the deposit is too small to mint a single unit
    /// - anything [`bonding_curve::purchase_amount`] reports
    pub fn apply_mint(&mut self, deposit: U256) -> Result<U256> {
        let minted = self.quote_mint(deposit)?;
        if minted.is_zero() {
            return Err(ContinuumError::invalid_amount(format!(
                "deposit {deposit} is too small to mint a unit"
            )));
        }

        let next = CurveState {
            total_supply: self
                .state
                .total_supply
                .checked_add(minted)
                .ok_or_else(overflow)?,
            reserve_balance: self
                .state
                .reserve_balance
                .checked_add(deposit)
                .ok_or_else(overflow)?,
            ..self.state
        };
        next.check_invariants()?;
        let deposited = self
            .total_deposited
            .checked_add(deposit)
            .ok_or_else(overflow)?;

        self.state = next;
        self.total_deposited = deposited;
        Ok(minted)
    }

    /// Burn `burn` of derivative and release the reserve it is worth.
    ///
    /// # Errors
    /// - `CurveInvariantViolation` if supply or reserve would reach zero
    /// - anything [`bonding_curve::sale_amount`] reports
    pub fn apply_burn(&mut self, burn: U256) -> Result<U256> {
        let returned = self.quote_burn(burn)?;

        let next = CurveState {
            total_supply: self
                .state
                .total_supply
                .checked_sub(burn)
                .ok_or_else(|| invariant("burn exceeds total supply"))?,
            reserve_balance: self
                .state
                .reserve_balance
                .checked_sub(returned)
                .ok_or_else(|| invariant("payout exceeds reserve balance"))?,
            ..self.state
        };
        next.check_invariants()?;
        let withdrawn = self
            .total_withdrawn
            .checked_add(returned)
            .ok_or_else(overflow)?;

        self.state = next;
        self.total_withdrawn = withdrawn;
        Ok(returned)
    }

    /// `initial + deposits - withdrawals`.
    pub fn expected_reserve(&self) -> Result<U256> {
        self.initial_reserve
            .checked_add(self.total_deposited)
            .and_then(|v| v.checked_sub(self.total_withdrawn))
            .ok_or_else(|| ContinuumError::ReserveConservationViolation {
                reason: format!(
                    "withdrawals {} exceed initial {} plus deposits {}",
                    self.total_withdrawn, self.initial_reserve, self.total_deposited
                ),
            })
    }

    /// # Errors
    /// `ReserveConservationViolation` if the tracked balance has drifted
    /// from the deposit/withdrawal history.
    pub fn verify_conservation(&self) -> Result<()> {
        let expected = self.expected_reserve()?;
        if self.state.reserve_balance != expected {
            return Err(ContinuumError::ReserveConservationViolation {
                reason: format!(
                    "reserve balance {} != expected {expected} \
                     (initial={}, deposits={}, withdrawals={})",
                    self.state.reserve_balance,
                    self.initial_reserve,
                    self.total_deposited,
                    self.total_withdrawn,
                ),
            });
        }
        Ok(())
    }
}

fn invariant(reason: &str) -> ContinuumError {
    ContinuumError::CurveInvariantViolation {
        reason: reason.into(),
    }
}
