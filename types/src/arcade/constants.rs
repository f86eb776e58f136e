/// Fixed-point scale for multipliers (1.0x = 10_000 basis points).
pub const BASE_MULTIPLIER: u64 = 10_000;

/// One hundredth of a multiplier in basis points.
pub const HUNDREDTH: u64 = BASE_MULTIPLIER / 100;

/// Number of reels on the slot machine.
pub const REEL_COUNT: usize = 3;

/// Multiplier applied to the running hi-lo multiplier on a correct "equal" guess.
pub const HILO_EQUAL_MULTIPLIER: u64 = 10 * BASE_MULTIPLIER;

/// Base growth of the hi-lo multiplier on a correct higher/lower guess (1.20x).
pub const HILO_STREAK_BASE: u64 = 12_000;

/// Extra growth per correct guess in the current streak (0.05x).
pub const HILO_STREAK_STEP: u64 = 500;

/// Default cooldown between crash and slot wagers.
pub const DEFAULT_COOLDOWN_SECS: u64 = 10;

/// Default wager bounds shared by every game.
pub const DEFAULT_MIN_BET: u64 = 10;
pub const DEFAULT_MAX_BET: u64 = 1_000;

/// Convert a decimal multiplier (e.g. `2.5`) to basis points, rounding to the nearest point.
///
/// Returns `None` for non-finite or negative input.
pub fn multiplier_to_bps(value: f64) -> Option<u64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = (value * BASE_MULTIPLIER as f64).round();
    if scaled > u64::MAX as f64 {
        return None;
    }
    Some(scaled as u64)
}

/// Render a multiplier with two decimals (`25_000` -> `"2.50"`), truncating sub-hundredths.
pub fn format_multiplier(bps: u64) -> String {
    let hundredths = bps / HUNDREDTH;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// `floor(amount * bps / BASE_MULTIPLIER)`, saturating on overflow.
pub fn apply_multiplier(amount: u64, bps: u64) -> u64 {
    let product = (amount as u128).saturating_mul(bps as u128) / BASE_MULTIPLIER as u128;
    product.min(u64::MAX as u128) as u64
}
