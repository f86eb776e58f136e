//! Game configuration.
//!
//! Field defaults mirror the stock arcade tables. `ArcadeConfig::prepare` normalizes wager bounds
//! and validates every table before the engine is built from it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    multiplier_to_bps, GameType, DEFAULT_COOLDOWN_SECS, DEFAULT_MAX_BET, DEFAULT_MIN_BET,
    REEL_COUNT,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{game}: weighted table is empty")]
    EmptyTable { game: GameType },
    #[error("{game}: entry {index} has an invalid weight ({weight})")]
    InvalidWeight {
        game: GameType,
        index: usize,
        weight: f64,
    },
    #[error("{game}: total weight must be positive")]
    ZeroTotalWeight { game: GameType },
    #[error("crash: range {index} is inverted ({lower} >= {upper})")]
    InvertedRange { index: usize, lower: f64, upper: f64 },
    #[error("crash: multiplier increment must be positive (got {0})")]
    InvalidIncrement(f64),
    #[error("crash: multiplier bounds are invalid ({min}..={max})")]
    InvalidMultiplierBounds { min: f64, max: f64 },
    #[error("slot: duplicate symbol {0}")]
    DuplicateSymbol(String),
    #[error("slot: partial win percentage must be at most 100 (got {0})")]
    PartialWinPercent(u64),
    #[error("slot: reel stop delays must be non-negative and non-decreasing")]
    ReelStopsOutOfOrder,
}

/// Inclusive wager bounds for one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WagerBounds {
    #[serde(default = "default_min_bet")]
    pub min_bet: u64,
    #[serde(default = "default_max_bet")]
    pub max_bet: u64,
}

impl Default for WagerBounds {
    fn default() -> Self {
        Self {
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
        }
    }
}

impl WagerBounds {
    /// Ensure the range is never empty: `max_bet` is raised to at least `min_bet + 1`.
    pub fn normalized(self) -> Self {
        Self {
            min_bet: self.min_bet,
            max_bet: self.max_bet.max(self.min_bet.saturating_add(1)),
        }
    }

    pub fn contains(&self, amount: u64) -> bool {
        amount >= self.min_bet && amount <= self.max_bet
    }
}

fn default_min_bet() -> u64 {
    DEFAULT_MIN_BET
}

fn default_max_bet() -> u64 {
    DEFAULT_MAX_BET
}

/// A weighted multiplier band `[lower, upper)` used to draw crash points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedRange {
    #[serde(alias = "start")]
    pub lower: f64,
    #[serde(alias = "end")]
    pub upper: f64,
    #[serde(alias = "chance")]
    pub weight: f64,
}

impl WeightedRange {
    pub const fn new(lower: f64, upper: f64, weight: f64) -> Self {
        Self {
            lower,
            upper,
            weight,
        }
    }
}

/// A weighted reel symbol and its three-of-a-kind multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedSymbol {
    pub symbol: String,
    pub multiplier: u64,
    #[serde(alias = "chance")]
    pub weight: f64,
}

impl WeightedSymbol {
    pub fn new(symbol: impl Into<String>, multiplier: u64, weight: f64) -> Self {
        Self {
            symbol: symbol.into(),
            multiplier,
            weight,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashConfig {
    #[serde(flatten)]
    pub bets: WagerBounds,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    pub multiplier_increment: f64,
    pub cooldown_secs: u64,
    pub multiplier_ranges: Vec<WeightedRange>,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            bets: WagerBounds::default(),
            min_multiplier: 1.1,
            max_multiplier: 9.9,
            multiplier_increment: 0.01,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            multiplier_ranges: vec![
                WeightedRange::new(1.0, 2.0, 55.0),
                WeightedRange::new(2.0, 3.0, 25.0),
                WeightedRange::new(3.0, 4.0, 10.0),
                WeightedRange::new(4.0, 5.0, 7.0),
                WeightedRange::new(5.0, 15.0, 3.0),
            ],
        }
    }
}

impl CrashConfig {
    /// Per-tick multiplier step in basis points.
    pub fn increment_bps(&self) -> u64 {
        multiplier_to_bps(self.multiplier_increment).unwrap_or(0)
    }

    /// Accepted target multiplier range in basis points.
    pub fn target_bounds_bps(&self) -> (u64, u64) {
        (
            multiplier_to_bps(self.min_multiplier).unwrap_or(0),
            multiplier_to_bps(self.max_multiplier).unwrap_or(0),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.increment_bps() == 0 {
            return Err(ConfigError::InvalidIncrement(self.multiplier_increment));
        }
        let (min, max) = self.target_bounds_bps();
        if min == 0 || min > max {
            return Err(ConfigError::InvalidMultiplierBounds {
                min: self.min_multiplier,
                max: self.max_multiplier,
            });
        }
        if self.multiplier_ranges.is_empty() {
            return Err(ConfigError::EmptyTable {
                game: GameType::Crash,
            });
        }
        for (index, range) in self.multiplier_ranges.iter().enumerate() {
            if !range.lower.is_finite() || !range.upper.is_finite() || range.lower >= range.upper
            {
                return Err(ConfigError::InvertedRange {
                    index,
                    lower: range.lower,
                    upper: range.upper,
                });
            }
        }
        validate_weights(
            GameType::Crash,
            self.multiplier_ranges.iter().map(|range| range.weight),
        )
    }
}

/// Delays (seconds after the wager) at which each reel stops.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelStops {
    pub first_stop: f64,
    pub second_stop: f64,
    pub third_stop: f64,
}

impl Default for ReelStops {
    fn default() -> Self {
        Self {
            first_stop: 1.0,
            second_stop: 2.0,
            third_stop: 3.0,
        }
    }
}

impl ReelStops {
    pub fn as_array(&self) -> [f64; REEL_COUNT] {
        [self.first_stop, self.second_stop, self.third_stop]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    #[serde(flatten)]
    pub bets: WagerBounds,
    pub cooldown_secs: u64,
    pub symbols: Vec<WeightedSymbol>,
    #[serde(alias = "slot_timers")]
    pub reel_stops: ReelStops,
    #[serde(alias = "partial_win_percentage")]
    pub partial_win_percent: u64,
    /// Only adjacent reels count as a pair when set; otherwise any two reels do.
    #[serde(alias = "sequential_symbols_only")]
    pub adjacent_pairs_only: bool,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            bets: WagerBounds::default(),
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            symbols: vec![
                WeightedSymbol::new("★", 10, 2.0),
                WeightedSymbol::new("♞", 8, 3.0),
                WeightedSymbol::new("⚓", 6, 3.0),
                WeightedSymbol::new("☕", 5, 4.0),
                WeightedSymbol::new("⚽", 4, 4.0),
                WeightedSymbol::new("☀", 3, 5.0),
                WeightedSymbol::new("☁", 2, 5.0),
                WeightedSymbol::new("✿", 15, 1.0),
                WeightedSymbol::new("☾", 20, 0.5),
            ],
            reel_stops: ReelStops::default(),
            partial_win_percent: 50,
            adjacent_pairs_only: false,
        }
    }
}

impl SlotConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyTable {
                game: GameType::Slot,
            });
        }
        for (index, symbol) in self.symbols.iter().enumerate() {
            if self.symbols[..index]
                .iter()
                .any(|earlier| earlier.symbol == symbol.symbol)
            {
                return Err(ConfigError::DuplicateSymbol(symbol.symbol.clone()));
            }
        }
        validate_weights(
            GameType::Slot,
            self.symbols.iter().map(|symbol| symbol.weight),
        )?;
        if self.partial_win_percent > 100 {
            return Err(ConfigError::PartialWinPercent(self.partial_win_percent));
        }
        let stops = self.reel_stops.as_array();
        let ordered = stops.iter().all(|delay| delay.is_finite() && *delay >= 0.0)
            && stops.windows(2).all(|pair| pair[0] <= pair[1]);
        if !ordered {
            return Err(ConfigError::ReelStopsOutOfOrder);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HiLoConfig {
    #[serde(flatten)]
    pub bets: WagerBounds,
    /// Hi-lo rounds are not rate limited unless configured.
    #[serde(default)]
    pub cooldown_secs: u64,
}

impl Default for HiLoConfig {
    fn default() -> Self {
        Self {
            bets: WagerBounds::default(),
            cooldown_secs: 0,
        }
    }
}

/// Configuration for every game hosted by one engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub crash: CrashConfig,
    pub slot: SlotConfig,
    pub hilo: HiLoConfig,
}

impl ArcadeConfig {
    /// Normalize wager bounds and validate every table.
    pub fn prepare(mut self) -> Result<Self, ConfigError> {
        self.crash.bets = self.crash.bets.normalized();
        self.slot.bets = self.slot.bets.normalized();
        self.hilo.bets = self.hilo.bets.normalized();
        self.crash.validate()?;
        self.slot.validate()?;
        Ok(self)
    }
}

fn validate_weights(
    game: GameType,
    weights: impl Iterator<Item = f64>,
) -> Result<(), ConfigError> {
    let mut total = 0.0;
    for (index, weight) in weights.enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::InvalidWeight {
                game,
                index,
                weight,
            });
        }
        total += weight;
    }
    if total <= 0.0 {
        return Err(ConfigError::ZeroTotalWeight { game });
    }
    Ok(())
}
