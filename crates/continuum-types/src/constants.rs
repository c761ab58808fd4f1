//! System-wide constants for the Continuum engine.

/// Reserve ratios are expressed in parts-per-million.
pub const MAX_RESERVE_RATIO_PPM: u32 = 1_000_000;

/// Reserve ratio for a linear price/supply relationship.
pub const LINEAR_RESERVE_RATIO_PPM: u32 = 500_000;

/// Default reserve ratio (linear curve).
pub const DEFAULT_RESERVE_RATIO_PPM: u32 = LINEAR_RESERVE_RATIO_PPM;

/// Decimals of both the reserve and the derivative asset.
pub const TOKEN_DECIMALS: u32 = 18;

/// Default mint-to-burn cooldown in seconds (15 minutes).
pub const DEFAULT_COOLDOWN_SECS: u64 = 15 * 60;

/// Default escrow lock duration in seconds (30 days).
pub const DEFAULT_ESCROW_LOCK_SECS: u64 = 30 * 24 * 60 * 60;

/// Lowest fixed-point precision (bits) the power function will fall back to.
pub const MIN_PRECISION: u8 = 32;

/// Highest fixed-point precision (bits) of the power function.
pub const MAX_PRECISION: u8 = 127;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Continuum";
