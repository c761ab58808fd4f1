//! Purchase and sale returns of the continuous bonding curve.
//!
//! ```text
//! purchase = S * ((1 + D / R) ^ (r / 1e6) - 1)
//! sale     = R * (1 - (1 - B / S) ^ (1e6 / r))
//! ```
//!
//! `S` = supply, `R` = reserve balance, `r` = reserve ratio (ppm),
//! `D` = deposit, `B` = burn amount.
//!
//! Both functions are pure: same inputs → same outputs on every node.
//! Every rounding step goes in the engine's favour (the caller receives
//! the floor), so a mint immediately unwound by a burn of the minted amount
//! never returns more than the deposit.

use continuum_types::{
    ContinuumError, CurveState, ONE_TOKEN, Result, U256, U512,
    constants::MAX_RESERVE_RATIO_PPM, mul_div, validate_reserve_ratio,
};

use tracing::debug;

use crate::power::{exceeds_exp_domain, exponent_argument, power, power_from_argument};

fn overflow() -> ContinuumError {
    ContinuumError::ArithmeticOverflow {
        context: "bonding curve",
    }
}

fn validate_state(supply: U256, reserve_balance: U256, reserve_ratio_ppm: u32) -> Result<()> {
    validate_reserve_ratio(reserve_ratio_ppm)?;
    if supply.is_zero() {
        return Err(ContinuumError::invalid_amount("supply must be positive"));
    }
    if reserve_balance.is_zero() {
        return Err(ContinuumError::invalid_amount(
            "reserve balance must be positive",
        ));
    }
    Ok(())
}

/// Derivative amount minted for depositing `deposit_amount` of reserve.
///
/// # Errors
/// - `InvalidAmount` if the deposit, supply or reserve is zero
/// - `InvalidReserveRatio` if the ratio is outside `1..=1_000_000`
/// - `ArithmeticOverflow` if the inputs exceed the fixed-point domain
pub fn purchase_amount(
    supply: U256,
    reserve_balance: U256,
    reserve_ratio_ppm: u32,
    deposit_amount: U256,
) -> Result<U256> {
    validate_state(supply, reserve_balance, reserve_ratio_ppm)?;
    if deposit_amount.is_zero() {
        return Err(ContinuumError::invalid_amount(
            "deposit amount must be positive",
        ));
    }

    // Full-reserve curve: price is constant.
    if reserve_ratio_ppm == MAX_RESERVE_RATIO_PPM {
        return mul_div(supply, deposit_amount, reserve_balance).ok_or_else(overflow);
    }

    let base_n = reserve_balance
        .checked_add(deposit_amount)
        .ok_or_else(overflow)?;
    let (result, precision) = power(
        base_n,
        reserve_balance,
        reserve_ratio_ppm,
        MAX_RESERVE_RATIO_PPM,
    )?;
    let new_supply = ((U512::from(supply) * U512::from(result)) >> usize::from(precision))
        .try_narrow()
        .ok_or_else(overflow)?;

    // result >= 2^precision, so new_supply >= supply.
    Ok(new_supply.saturating_sub(supply))
}

/// Reserve amount returned for burning `burn_amount` of derivative.
///
/// # Errors
/// - `InvalidAmount` if the burn is zero or not strictly below supply, or
///   if supply/reserve is zero
/// - `InvalidReserveRatio` if the ratio is outside `1..=1_000_000`
/// - `ArithmeticOverflow` if the inputs exceed the fixed-point domain
///
/// A burn deep enough that the remaining reserve share underflows the
/// exponent table pays out `reserve - 1` (for reserves below `2^223`).
pub fn sale_amount(
    supply: U256,
    reserve_balance: U256,
    reserve_ratio_ppm: u32,
    burn_amount: U256,
) -> Result<U256> {
    validate_state(supply, reserve_balance, reserve_ratio_ppm)?;
    if burn_amount.is_zero() {
        return Err(ContinuumError::invalid_amount("burn amount must be positive"));
    }
    if burn_amount >= supply {
        return Err(ContinuumError::invalid_amount(format!(
            "burn amount {burn_amount} must be below total supply {supply}"
        )));
    }

    if reserve_ratio_ppm == MAX_RESERVE_RATIO_PPM {
        return mul_div(reserve_balance, burn_amount, supply).ok_or_else(overflow);
    }

    // (S / (S - B)) ^ (1e6 / r) keeps the base >= 1.
    let argument = exponent_argument(
        supply,
        supply - burn_amount,
        MAX_RESERVE_RATIO_PPM,
        reserve_ratio_ppm,
    )?;
    if exceeds_exp_domain(argument) {
        // (1 - B/S)^(1e6/r) < e^-155 < 2^-223: the payout is the whole
        // reserve less a fraction of a unit.
        let returned = saturated_sale(reserve_balance);
        debug!(reserve = %reserve_balance, returned = %returned, "sale saturated");
        return Ok(returned);
    }
    let (result, precision) =
        power_from_argument(argument, MAX_RESERVE_RATIO_PPM, reserve_ratio_ppm)?;
    let one = U256::one() << usize::from(precision);

    // R * (1 - 2^p / result), rounded down.
    mul_div(reserve_balance, result - one, result).ok_or_else(overflow)
}

/// Floor of `R * (1 - e)` for any `e < 2^-223`.
fn saturated_sale(reserve_balance: U256) -> U256 {
    reserve_balance - (reserve_balance >> 223usize) - U256::one()
}

/// Marginal price of one whole derivative token, in reserve base units.
///
/// ```text
/// price = R / (S * r / 1e6)
/// ```
pub fn spot_price(state: &CurveState) -> Result<U256> {
    validate_state(
        state.total_supply,
        state.reserve_balance,
        state.reserve_ratio_ppm,
    )?;
    let numerator = U512::from(state.reserve_balance)
        * U512::from(ONE_TOKEN)
        * U512::from(MAX_RESERVE_RATIO_PPM);
    let denominator = U512::from(state.total_supply) * U512::from(state.reserve_ratio_ppm);
    (numerator / denominator).try_narrow().ok_or_else(overflow)
}

/// [`purchase_amount`] against a [`CurveState`].
pub fn quote_purchase(state: &CurveState, deposit_amount: U256) -> Result<U256> {
    purchase_amount(
        state.total_supply,
        state.reserve_balance,
        state.reserve_ratio_ppm,
        deposit_amount,
    )
}

/// [`sale_amount`] against a [`CurveState`].
pub fn quote_sale(state: &CurveState, burn_amount: U256) -> Result<U256> {
    sale_amount(
        state.total_supply,
        state.reserve_balance,
        state.reserve_ratio_ppm,
        burn_amount,
    )
}
