//! Fixed-width integers used for every amount in Continuum.
//!
//! Amounts are [`U256`] base units (18 decimals by convention). [`U512`]
//! only ever holds intermediate `a * b` products so that `a * b / d` never
//! overflows before the division.

#![allow(clippy::manual_div_ceil, clippy::assign_op_pattern)]

use uint::construct_uint;

use crate::constants::TOKEN_DECIMALS;

construct_uint! {
    /// 256-bit unsigned integer for supplies, balances, and fixed-point values.
    pub struct U256(4);
}

construct_uint! {
    /// 512-bit unsigned integer for intermediate products.
    pub struct U512(8);
}

/// One whole token (`10^TOKEN_DECIMALS` base units).
pub const ONE_TOKEN: U256 = U256([10u64.pow(TOKEN_DECIMALS), 0, 0, 0]);

/// `whole` tokens expressed in base units.
///
/// # Panics
/// Never in practice: `u64::MAX * 10^18` fits comfortably in 256 bits.
#[must_use]
pub fn tokens(whole: u64) -> U256 {
    U256::from(whole) * ONE_TOKEN
}

impl From<U256> for U512 {
    fn from(value: U256) -> Self {
        let [a, b, c, d] = value.0;
        U512([a, b, c, d, 0, 0, 0, 0])
    }
}

impl U512 {
    /// Narrow back to 256 bits, or `None` if the value does not fit.
    #[must_use]
    pub fn try_narrow(self) -> Option<U256> {
        let w = self.0;
        if w[4..].iter().any(|&word| word != 0) {
            return None;
        }
        Some(U256([w[0], w[1], w[2], w[3]]))
    }
}

/// Compute `floor(a * b / d)` with a 512-bit intermediate product.
///
/// Returns `None` when `d` is zero or the quotient does not fit in 256 bits.
#[must_use]
pub fn mul_div(a: U256, b: U256, d: U256) -> Option<U256> {
    if d.is_zero() {
        return None;
    }
    (U512::from(a) * U512::from(b) / U512::from(d)).try_narrow()
}

/// Serde adapter that writes [`U256`] amounts as decimal strings.
///
/// JSON numbers lose precision above 2^53, so amounts always travel as
/// strings: `"1000000000000000000"`.
pub mod amount_serde {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::U256;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(&raw)
            .map_err(|e| de::Error::custom(format!("invalid amount {raw:?}: {e:?}")))
    }
}
