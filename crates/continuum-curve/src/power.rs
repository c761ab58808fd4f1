//! Fixed-point `base^exponent` with graceful precision degradation.
//!
//! ```text
//! power(bN, bD, eN, eD) = (bN / bD) ^ (eN / eD)   scaled by 2^precision
//! ```
//!
//! The computation never leaves integer arithmetic:
//!
//! 1. `base = bN * 2^127 / bD` (127-bit fixed point, base >= 1)
//! 2. `ln(base)` via `floor(log2)` plus 127 rounds of square-and-compare
//! 3. multiply by `eN / eD`
//! 4. pick the highest precision whose [`MAX_EXP_ARRAY`] bound admits the
//!    argument, so the exponentiation below cannot overflow 256 bits
//! 5. `e^x = 2^k * e^r` with `r < ln 2`, a 33-term Taylor series for `e^r`
//!    at 127 bits, then rescale to the chosen precision
//!
//! Every step rounds down, so the result never exceeds the exact value.
//! Since the result is always at least `2^precision` and the precision is
//! never below [`MIN_PRECISION`], the relative error is below `2^-32`.

use continuum_types::{
    ContinuumError, Result, U256,
    constants::{MAX_PRECISION, MIN_PRECISION},
};

/// 1.0 in 127-bit fixed point.
const FIXED_1: U256 = U256([0, 0x8000_0000_0000_0000, 0, 0]);

/// 2.0 in 127-bit fixed point.
const FIXED_2: U256 = U256([0, 0, 1, 0]);

/// Exclusive upper bound on the base numerator (2^129).
pub const MAX_NUM: U256 = U256([0, 0, 2, 0]);

/// `ln 2 ~= LN2_NUMERATOR / LN2_DENOMINATOR`, rounded down.
const LN2_NUMERATOR: u128 = 0x2c5c85fdf473de6af278ece600fcbda;
const LN2_DENOMINATOR: u128 = 0x4000000000000000000000000000000;

/// `ln 2` in 127-bit fixed point, rounded up. Used for range reduction so
/// the reduced argument never exceeds the true one.
const LN2_CEIL: u128 = 0x58b90bfbe8e7bcd5e4f1d9cc01f97b58;

/// 33!
const FACTORIAL_33: u128 = 0x688589cc0e9505e2f2fee5580000000;

/// `33! / k!` for `k = 2..=33`.
const EXP_COEFFICIENTS: [u128; 32] = [
    0x3442c4e6074a82f1797f72ac0000000, // 33! / 2!
    0x116b96f757c380fb287fd0e40000000, // 33! / 3!
    0x45ae5bdd5f0e03eca1ff4390000000, // 33! / 4!
    0xdefabf91302cd95b9ffda50000000, // 33! / 5!
    0x2529ca9832b22439efff9b8000000, // 33! / 6!
    0x54f1cf12bd04e516b6da88000000, // 33! / 7!
    0xa9e39e257a09ca2d6db51000000, // 33! / 8!
    0x12e066e7b839fa050c309000000, // 33! / 9!
    0x1e33d7d926c329a1ad1a800000, // 33! / 10!
    0x2bee513bdb4a6b19b5f800000, // 33! / 11!
    0x3a9316fa79b88eccf2a00000, // 33! / 12!
    0x48177ebe1fa812375200000, // 33! / 13!
    0x5263fe90242dcbacf00000, // 33! / 14!
    0x57e22099c030d94100000, // 33! / 15!
    0x57e22099c030d9410000, // 33! / 16!
    0x52b6b54569976310000, // 33! / 17!
    0x4985f67696bf748000, // 33! / 18!
    0x3dea12ea99e498000, // 33! / 19!
    0x31880f2214b6e000, // 33! / 20!
    0x25bcff56eb36000, // 33! / 21!
    0x1b722e10ab1000, // 33! / 22!
    0x1317c70077000, // 33! / 23!
    0xcba84aafa00, // 33! / 24!
    0x82573a0a00, // 33! / 25!
    0x5035ad900, // 33! / 26!
    0x2f881b00, // 33! / 27!
    0x1b29340, // 33! / 28!
    0xefc40, // 33! / 29!
    0x7fe0, // 33! / 30!
    0x420, // 33! / 31!
    0x21, // 33! / 32!
    0x1, // 33! / 33!
];

/// Largest exponent argument (in 127-bit fixed point) that [`general_exp`]
/// can evaluate at each precision without exceeding 256 bits.
///
/// Indexed by precision; entries below [`MIN_PRECISION`] are unused.
/// Non-increasing from index 32 to 127.
pub static MAX_EXP_ARRAY: [U256; 128] = [
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0, 0, 0, 0]),
    U256([0x539e9281ba4becff, 0xa1ea7c6bcac53b28, 0x000000000000004d, 0x0000000000000000]), // 32
    U256([0x6eacb8b5b85271a7, 0x4931706fe1dd7e52, 0x000000000000004d, 0x0000000000000000]), // 33
    U256([0x89badee9b658f64f, 0xf0786473f8f5c17c, 0x000000000000004c, 0x0000000000000000]), // 34
    U256([0xa4c9051db45f7af7, 0x97bf5878100e04a6, 0x000000000000004c, 0x0000000000000000]), // 35
    U256([0xbfd72b51b265ff9f, 0x3f064c7c272647d0, 0x000000000000004c, 0x0000000000000000]), // 36
    U256([0xdae55185b06c8447, 0xe64d40803e3e8afa, 0x000000000000004b, 0x0000000000000000]), // 37
    U256([0xf5f377b9ae7308ef, 0x8d9434845556ce24, 0x000000000000004b, 0x0000000000000000]), // 38
    U256([0x11019dedac798d97, 0x34db28886c6f114f, 0x000000000000004b, 0x0000000000000000]), // 39
    U256([0x2c0fc421aa80123f, 0xdc221c8c83875479, 0x000000000000004a, 0x0000000000000000]), // 40
    U256([0x471dea55a88696e7, 0x836910909a9f97a3, 0x000000000000004a, 0x0000000000000000]), // 41
    U256([0x622c1089a68d1b8f, 0x2ab00494b1b7dacd, 0x000000000000004a, 0x0000000000000000]), // 42
    U256([0x7d3a36bda493a037, 0xd1f6f898c8d01df7, 0x0000000000000049, 0x0000000000000000]), // 43
    U256([0x98485cf1a29a24df, 0x793dec9cdfe86121, 0x0000000000000049, 0x0000000000000000]), // 44
    U256([0xb3568325a0a0a987, 0x2084e0a0f700a44b, 0x0000000000000049, 0x0000000000000000]), // 45
    U256([0xce64a9599ea72e2f, 0xc7cbd4a50e18e775, 0x0000000000000048, 0x0000000000000000]), // 46
    U256([0xe972cf8d9cadb2d7, 0x6f12c8a925312a9f, 0x0000000000000048, 0x0000000000000000]), // 47
    U256([0x0480f5c19ab4377f, 0x1659bcad3c496dca, 0x0000000000000048, 0x0000000000000000]), // 48
    U256([0x1f8f1bf598babc27, 0xbda0b0b15361b0f4, 0x0000000000000047, 0x0000000000000000]), // 49
    U256([0x3a9d422996c140cf, 0x64e7a4b56a79f41e, 0x0000000000000047, 0x0000000000000000]), // 50
    U256([0x55ab685d94c7c577, 0x0c2e98b981923748, 0x0000000000000047, 0x0000000000000000]), // 51
    U256([0x70b98e9192ce4a1f, 0xb3758cbd98aa7a72, 0x0000000000000046, 0x0000000000000000]), // 52
    U256([0x8bc7b4c590d4cec7, 0x5abc80c1afc2bd9c, 0x0000000000000046, 0x0000000000000000]), // 53
    U256([0xa6d5daf98edb536f, 0x020374c5c6db00c6, 0x0000000000000046, 0x0000000000000000]), // 54
    U256([0xc1e4012d8ce1d817, 0xa94a68c9ddf343f0, 0x0000000000000045, 0x0000000000000000]), // 55
    U256([0xdcf227618ae85cbf, 0x50915ccdf50b871a, 0x0000000000000045, 0x0000000000000000]), // 56
    U256([0xf8004d9588eee167, 0xf7d850d20c23ca44, 0x0000000000000044, 0x0000000000000000]), // 57
    U256([0x130e73c986f5660f, 0x9f1f44d6233c0d6f, 0x0000000000000044, 0x0000000000000000]), // 58
    U256([0x2e1c99fd84fbeab7, 0x466638da3a545099, 0x0000000000000044, 0x0000000000000000]), // 59
    U256([0x492ac03183026f5f, 0xedad2cde516c93c3, 0x0000000000000043, 0x0000000000000000]), // 60
    U256([0x6438e6658108f407, 0x94f420e26884d6ed, 0x0000000000000043, 0x0000000000000000]), // 61
    U256([0x7f470c997f0f78af, 0x3c3b14e67f9d1a17, 0x0000000000000043, 0x0000000000000000]), // 62
    U256([0x9a5532cd7d15fd57, 0xe38208ea96b55d41, 0x0000000000000042, 0x0000000000000000]), // 63
    U256([0xb56359017b1c81ff, 0x8ac8fceeadcda06b, 0x0000000000000042, 0x0000000000000000]), // 64
    U256([0xd0717f35792306a7, 0x320ff0f2c4e5e395, 0x0000000000000042, 0x0000000000000000]), // 65
    U256([0xeb7fa56977298b4f, 0xd956e4f6dbfe26bf, 0x0000000000000041, 0x0000000000000000]), // 66
    U256([0x068dcb9d75300ff7, 0x809dd8faf31669ea, 0x0000000000000041, 0x0000000000000000]), // 67
    U256([0x219bf1d17336949f, 0x27e4ccff0a2ead14, 0x0000000000000041, 0x0000000000000000]), // 68
    U256([0x3caa1805713d1947, 0xcf2bc1032146f03e, 0x0000000000000040, 0x0000000000000000]), // 69
    U256([0x57b83e396f439def, 0x7672b507385f3368, 0x0000000000000040, 0x0000000000000000]), // 70
    U256([0x72c6646d6d4a2297, 0x1db9a90b4f777692, 0x0000000000000040, 0x0000000000000000]), // 71
    U256([0x8dd48aa16b50a73f, 0xc5009d0f668fb9bc, 0x000000000000003f, 0x0000000000000000]), // 72
    U256([0xa8e2b0d569572be7, 0x6c4791137da7fce6, 0x000000000000003f, 0x0000000000000000]), // 73
    U256([0xc3f0d709675db08f, 0x138e851794c04010, 0x000000000000003f, 0x0000000000000000]), // 74
    U256([0xdefefd3d65643537, 0xbad5791babd8833a, 0x000000000000003e, 0x0000000000000000]), // 75
    U256([0xfa0d2371636ab9df, 0x621c6d1fc2f0c664, 0x000000000000003e, 0x0000000000000000]), // 76
    U256([0x151b49a561713e87, 0x09636123da09098f, 0x000000000000003e, 0x0000000000000000]), // 77
    U256([0x30296fd95f77c32f, 0xb0aa5527f1214cb9, 0x000000000000003d, 0x0000000000000000]), // 78
    U256([0x4b37960d5d7e47d7, 0x57f1492c08398fe3, 0x000000000000003d, 0x0000000000000000]), // 79
    U256([0x6645bc415b84cc7f, 0xff383d301f51d30d, 0x000000000000003c, 0x0000000000000000]), // 80
    U256([0x8153e275598b5127, 0xa67f3134366a1637, 0x000000000000003c, 0x0000000000000000]), // 81
    U256([0x9c6208a95791d5cf, 0x4dc625384d825961, 0x000000000000003c, 0x0000000000000000]), // 82
    U256([0xb7702edd55985a77, 0xf50d193c649a9c8b, 0x000000000000003b, 0x0000000000000000]), // 83
    U256([0xd27e5511539edf1f, 0x9c540d407bb2dfb5, 0x000000000000003b, 0x0000000000000000]), // 84
    U256([0xed8c7b4551a563c7, 0x439b014492cb22df, 0x000000000000003b, 0x0000000000000000]), // 85
    U256([0x089aa1794fabe86f, 0xeae1f548a9e3660a, 0x000000000000003a, 0x0000000000000000]), // 86
    U256([0x23a8c7ad4db26d17, 0x9228e94cc0fba934, 0x000000000000003a, 0x0000000000000000]), // 87
    U256([0x3eb6ede14bb8f1bf, 0x396fdd50d813ec5e, 0x000000000000003a, 0x0000000000000000]), // 88
    U256([0x59c5141549bf7667, 0xe0b6d154ef2c2f88, 0x0000000000000039, 0x0000000000000000]), // 89
    U256([0x74d33a4947c5fb0f, 0x87fdc559064472b2, 0x0000000000000039, 0x0000000000000000]), // 90
    U256([0x8fe1607d45cc7fb7, 0x2f44b95d1d5cb5dc, 0x0000000000000039, 0x0000000000000000]), // 91
    U256([0xaaef86b143d3045f, 0xd68bad613474f906, 0x0000000000000038, 0x0000000000000000]), // 92
    U256([0xc5fdace541d98907, 0x7dd2a1654b8d3c30, 0x0000000000000038, 0x0000000000000000]), // 93
    U256([0xe10bd3193fe00daf, 0x2519956962a57f5a, 0x0000000000000038, 0x0000000000000000]), // 94
    U256([0xfc19f94d3de69257, 0xcc60896d79bdc284, 0x0000000000000037, 0x0000000000000000]), // 95
    U256([0x17281f813bed16ff, 0x73a77d7190d605af, 0x0000000000000037, 0x0000000000000000]), // 96
    U256([0x323645b539f39ba7, 0x1aee7175a7ee48d9, 0x0000000000000037, 0x0000000000000000]), // 97
    U256([0x4d446be937fa204f, 0xc2356579bf068c03, 0x0000000000000036, 0x0000000000000000]), // 98
    U256([0x6852921d3600a4f7, 0x697c597dd61ecf2d, 0x0000000000000036, 0x0000000000000000]), // 99
    U256([0x8360b8513407299f, 0x10c34d81ed371257, 0x0000000000000036, 0x0000000000000000]), // 100
    U256([0x9e6ede85320dae47, 0xb80a4186044f5581, 0x0000000000000035, 0x0000000000000000]), // 101
    U256([0xb97d04b9301432ef, 0x5f51358a1b6798ab, 0x0000000000000035, 0x0000000000000000]), // 102
    U256([0xd48b2aed2e1ab797, 0x0698298e327fdbd5, 0x0000000000000035, 0x0000000000000000]), // 103
    U256([0xef9951212c213c3f, 0xaddf1d9249981eff, 0x0000000000000034, 0x0000000000000000]), // 104
    U256([0x0aa777552a27c0e7, 0x5526119660b0622a, 0x0000000000000034, 0x0000000000000000]), // 105
    U256([0x25b59d89282e458f, 0xfc6d059a77c8a554, 0x0000000000000033, 0x0000000000000000]), // 106
    U256([0x40c3c3bd2634ca37, 0xa3b3f99e8ee0e87e, 0x0000000000000033, 0x0000000000000000]), // 107
    U256([0x5bd1e9f1243b4edf, 0x4afaeda2a5f92ba8, 0x0000000000000033, 0x0000000000000000]), // 108
    U256([0x76e010252241d387, 0xf241e1a6bd116ed2, 0x0000000000000032, 0x0000000000000000]), // 109
    U256([0x91ee36592048582f, 0x9988d5aad429b1fc, 0x0000000000000032, 0x0000000000000000]), // 110
    U256([0xacfc5c8d1e4edcd7, 0x40cfc9aeeb41f526, 0x0000000000000032, 0x0000000000000000]), // 111
    U256([0xc80a82c11c55617f, 0xe816bdb3025a3850, 0x0000000000000031, 0x0000000000000000]), // 112
    U256([0xe318a8f51a5be627, 0x8f5db1b719727b7a, 0x0000000000000031, 0x0000000000000000]), // 113
    U256([0xfe26cf2918626acf, 0x36a4a5bb308abea4, 0x0000000000000031, 0x0000000000000000]), // 114
    U256([0x1934f55d1668ef77, 0xddeb99bf47a301cf, 0x0000000000000030, 0x0000000000000000]), // 115
    U256([0x34431b91146f741f, 0x85328dc35ebb44f9, 0x0000000000000030, 0x0000000000000000]), // 116
    U256([0x4f5141c51275f8c7, 0x2c7981c775d38823, 0x0000000000000030, 0x0000000000000000]), // 117
    U256([0x6a5f67f9107c7d6f, 0xd3c075cb8cebcb4d, 0x000000000000002f, 0x0000000000000000]), // 118
    U256([0x856d8e2d0e830217, 0x7b0769cfa4040e77, 0x000000000000002f, 0x0000000000000000]), // 119
    U256([0xa07bb4610c8986bf, 0x224e5dd3bb1c51a1, 0x000000000000002f, 0x0000000000000000]), // 120
    U256([0xbb89da950a900b67, 0xc99551d7d23494cb, 0x000000000000002e, 0x0000000000000000]), // 121
    U256([0xd69800c90896900f, 0x70dc45dbe94cd7f5, 0x000000000000002e, 0x0000000000000000]), // 122
    U256([0xf1a626fd069d14b7, 0x182339e000651b1f, 0x000000000000002e, 0x0000000000000000]), // 123
    U256([0x0cb44d3104a3995f, 0xbf6a2de4177d5e4a, 0x000000000000002d, 0x0000000000000000]), // 124
    U256([0x27c2736502aa1e07, 0x66b121e82e95a174, 0x000000000000002d, 0x0000000000000000]), // 125
    U256([0x42d0999900b0a2af, 0x0df815ec45ade49e, 0x000000000000002d, 0x0000000000000000]), // 126
    U256([0x5ddebfccfeb72757, 0xb53f09f05cc627c8, 0x000000000000002c, 0x0000000000000000]), // 127
];

fn overflow() -> ContinuumError {
    ContinuumError::ArithmeticOverflow { context: "fixed-point power" }
}

/// Compute `(base_n / base_d) ^ (exp_n / exp_d)`.
///
/// Returns `(result, precision)` where the real value is
/// `result / 2^precision`.
///
/// # Errors
/// - `InvalidAmount` if `base_d`, `exp_n` or `exp_d` is zero, or the base
///   is below one
/// - `ArithmeticOverflow` if `base_n >= 2^129` or the exponent argument
///   exceeds even the [`MIN_PRECISION`] bound
pub fn power(base_n: U256, base_d: U256, exp_n: u32, exp_d: u32) -> Result<(U256, u8)> {
    let argument = exponent_argument(base_n, base_d, exp_n, exp_d)?;
    power_from_argument(argument, exp_n, exp_d)
}

/// `ln(base_n / base_d) * exp_n / exp_d` in 127-bit fixed point, rounded
/// down. This is the value [`power`] exponentiates.
///
/// # Errors
/// Same input checks as [`power`].
pub fn exponent_argument(base_n: U256, base_d: U256, exp_n: u32, exp_d: u32) -> Result<U256> {
    if base_d.is_zero() {
        return Err(ContinuumError::invalid_amount("power base denominator is zero"));
    }
    if exp_n == 0 || exp_d == 0 {
        return Err(ContinuumError::invalid_amount(format!(
            "power exponent {exp_n}/{exp_d} is not positive"
        )));
    }
    if base_n < base_d {
        return Err(ContinuumError::invalid_amount("power base is below one"));
    }
    if base_n >= MAX_NUM {
        return Err(overflow());
    }

    let base = base_n.checked_mul(FIXED_1).ok_or_else(overflow)? / base_d;
    let base_log = general_log(base)?;
    Ok(base_log
        .checked_mul(U256::from(exp_n))
        .ok_or_else(overflow)?
        / U256::from(exp_d))
}

/// Whether `argument` is beyond what even [`MIN_PRECISION`] can hold.
#[must_use]
pub fn exceeds_exp_domain(argument: U256) -> bool {
    argument > MAX_EXP_ARRAY[usize::from(MIN_PRECISION)]
}

/// `(base_n / base_d) ^ (exp_n / exp_d)` from a precomputed
/// [`exponent_argument`].
///
/// # Errors
/// `ArithmeticOverflow` if the argument [`exceeds_exp_domain`].
pub fn power_from_argument(argument: U256, exp_n: u32, exp_d: u32) -> Result<(U256, u8)> {
    let precision = find_position_in_max_exp_array(argument)?;
    let result = general_exp(argument, precision)?;

    tracing::debug!(
        exp_n,
        exp_d,
        precision,
        degraded = precision < MAX_PRECISION,
        "power evaluated"
    );
    Ok((result, precision))
}

/// Natural logarithm of a 127-bit fixed-point value `x >= 1`, rounded down.
pub fn general_log(x: U256) -> Result<U256> {
    let mut x = x;
    let mut res = U256::zero();

    // Integer part of log2(x).
    if x >= FIXED_2 {
        let count = floor_log2(x / FIXED_1);
        x = x >> count;
        res = U256::from(count) * FIXED_1;
    }

    // Fractional part, one bit per round. 1 < x < 2 on entry.
    if x > FIXED_1 {
        for i in (1..=MAX_PRECISION).rev() {
            x = x.checked_mul(x).ok_or_else(overflow)? / FIXED_1;
            if x >= FIXED_2 {
                x = x >> 1usize;
                res = res + (U256::one() << usize::from(i - 1));
            }
        }
    }

    Ok(res
        .checked_mul(U256::from(LN2_NUMERATOR))
        .ok_or_else(overflow)?
        / U256::from(LN2_DENOMINATOR))
}

/// `e^x` for a 127-bit fixed-point `x`, returned at `precision` bits.
///
/// The caller must have checked `x <= MAX_EXP_ARRAY[precision]`; anything
/// larger reports `ArithmeticOverflow` instead of wrapping.
pub fn general_exp(x: U256, precision: u8) -> Result<U256> {
    let ln2 = U256::from(LN2_CEIL);
    let k = x / ln2;
    let r = x - k * ln2;
    let reduced = exp_series(r)?;

    // reduced < 2^128, so any k above 256 cannot fit.
    if k > U256::from(256u64) {
        return Err(overflow());
    }
    let up = usize::try_from(k.low_u64()).map_err(|_| overflow())? + usize::from(precision);
    let max = usize::from(MAX_PRECISION);
    if up >= max {
        let shift = up - max;
        if reduced.bits() + shift > 256 {
            return Err(overflow());
        }
        Ok(reduced << shift)
    } else {
        Ok(reduced >> (max - up))
    }
}

/// Taylor series of `e^r` at 127 bits for `0 <= r < ln 2`.
fn exp_series(r: U256) -> Result<U256> {
    let mut xi = r;
    let mut res = U256::zero();
    for &coefficient in &EXP_COEFFICIENTS {
        xi = xi.checked_mul(r).ok_or_else(overflow)? >> usize::from(MAX_PRECISION);
        res = res
            .checked_add(
                xi.checked_mul(U256::from(coefficient))
                    .ok_or_else(overflow)?,
            )
            .ok_or_else(overflow)?;
    }
    Ok(res / U256::from(FACTORIAL_33) + r + FIXED_1)
}

/// Highest precision in `[MIN_PRECISION, MAX_PRECISION]` whose bound admits `x`.
pub fn find_position_in_max_exp_array(x: U256) -> Result<u8> {
    let mut lo = MIN_PRECISION;
    let mut hi = MAX_PRECISION;
    while lo + 1 < hi {
        let mid = (lo + hi) / 2;
        if MAX_EXP_ARRAY[usize::from(mid)] >= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    if MAX_EXP_ARRAY[usize::from(hi)] >= x {
        return Ok(hi);
    }
    if MAX_EXP_ARRAY[usize::from(lo)] >= x {
        return Ok(lo);
    }
    Err(overflow())
}

/// `floor(log2(n))` for `n >= 1`.
fn floor_log2(n: U256) -> usize {
    n.bits().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> U256 {
        U256::from_dec_str(s).unwrap()
    }

    fn within(got: U256, exact: U256, bits: usize) -> bool {
        let diff = if got > exact { got - exact } else { exact - got };
        diff <= exact >> bits
    }

    #[test]
    fn one_to_any_power_is_exactly_one() {
        for (n, d) in [(1, 1), (1_000_000, 1), (7, 3)] {
            let (r, p) = power(U256::from(5u64), U256::from(5u64), n, d).unwrap();
            assert_eq!(p, MAX_PRECISION);
            assert_eq!(r, FIXED_1);
        }
    }

    #[test]
    fn square_root_of_eleven() {
        let (r, p) = power(U256::from(11u64), U256::one(), 500_000, 1_000_000).unwrap();
        assert_eq!(p, 127);
        assert_eq!(r, dec("564294466925398389923655594294449120722"));
        // sqrt(11 * 2^252) * 2 = sqrt(11) * 2^127, up to isqrt rounding.
        let reference = (U256::from(11u64) << 252usize).integer_sqrt() << 1usize;
        assert!(within(r, reference, 100));
    }

    #[test]
    fn two_to_the_first_rounds_down() {
        let (r, p) = power(U256::from(2u64), U256::one(), 1, 1).unwrap();
        assert_eq!(p, 127);
        assert!(r < FIXED_2);
        assert_eq!(FIXED_2 - r, U256::from(48u64));
    }

    #[test]
    fn large_argument_degrades_precision() {
        // (10^6)^10 = 10^60 needs ~199 bits before scaling.
        let (r, p) = power(U256::from(1_000_000u64), U256::one(), 10, 1).unwrap();
        assert_eq!(p, 56);
        let exact = U256::exp10(60) << 56usize;
        assert!(r <= exact);
        assert!(within(r, exact, 64));
    }

    #[test]
    fn maximum_base_at_unit_exponent_keeps_full_precision() {
        let base = MAX_NUM - U256::one();
        let (r, p) = power(base, U256::one(), 1, 1).unwrap();
        assert_eq!(p, 127);
        assert!(within(r, base << 127usize, 100));
    }

    #[test]
    fn overflow_beyond_minimum_precision() {
        let base = MAX_NUM - U256::one();
        let err = power(base, U256::one(), 1_000_000, 1).unwrap_err();
        assert!(matches!(err, ContinuumError::ArithmeticOverflow { .. }));

        let err = power(MAX_NUM, U256::one(), 1, 1).unwrap_err();
        assert!(matches!(err, ContinuumError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let one = U256::one();
        let two = U256::from(2u64);
        for result in [
            power(two, U256::zero(), 1, 1),
            power(one, two, 1, 1),
            power(two, one, 0, 1),
            power(two, one, 1, 0),
        ] {
            assert!(matches!(
                result,
                Err(ContinuumError::InvalidAmount { .. })
            ));
        }
    }

    #[test]
    fn general_log_of_two() {
        assert_eq!(general_log(FIXED_1).unwrap(), U256::zero());
        let ln2 = general_log(FIXED_2).unwrap();
        assert_eq!(ln2, dec("117932881612756647068972071382077242176"));
        assert!(ln2 < U256::from(LN2_CEIL));
    }

    #[test]
    fn general_exp_of_zero_is_one() {
        for p in [MIN_PRECISION, 64, MAX_PRECISION] {
            assert_eq!(general_exp(U256::zero(), p).unwrap(), U256::one() << usize::from(p));
        }
    }

    #[test]
    fn table_is_non_increasing() {
        for p in 0..usize::from(MIN_PRECISION) {
            assert!(MAX_EXP_ARRAY[p].is_zero());
        }
        for p in usize::from(MIN_PRECISION)..usize::from(MAX_PRECISION) {
            assert!(MAX_EXP_ARRAY[p] >= MAX_EXP_ARRAY[p + 1], "precision {p}");
        }
    }

    #[test]
    fn table_bounds_are_tight() {
        for p in [MIN_PRECISION, 80, MAX_PRECISION] {
            let bound = MAX_EXP_ARRAY[usize::from(p)];
            assert!(general_exp(bound, p).is_ok(), "precision {p}");
            assert!(
                matches!(
                    general_exp(bound + U256::one(), p),
                    Err(ContinuumError::ArithmeticOverflow { .. })
                ),
                "precision {p}"
            );
        }
    }

    #[test]
    fn position_search_prefers_highest_precision() {
        assert_eq!(find_position_in_max_exp_array(U256::zero()).unwrap(), MAX_PRECISION);
        let at_min = MAX_EXP_ARRAY[usize::from(MIN_PRECISION)];
        assert_eq!(find_position_in_max_exp_array(at_min).unwrap(), MIN_PRECISION);
        assert!(find_position_in_max_exp_array(at_min + U256::one()).is_err());
    }

    #[test]
    fn exp_domain_edge() {
        let at_min = MAX_EXP_ARRAY[usize::from(MIN_PRECISION)];
        assert!(!exceeds_exp_domain(at_min));
        assert!(exceeds_exp_domain(at_min + U256::one()));

        // ln(5) * 100 > 155.26
        let argument =
            exponent_argument(U256::from(5u64), U256::one(), 1_000_000, 10_000).unwrap();
        assert!(exceeds_exp_domain(argument));
        assert!(power_from_argument(argument, 1_000_000, 10_000).is_err());

        let argument = exponent_argument(U256::from(11u64), U256::one(), 1, 2).unwrap();
        assert_eq!(
            power_from_argument(argument, 1, 2).unwrap(),
            power(U256::from(11u64), U256::one(), 1, 2).unwrap()
        );
    }
}
