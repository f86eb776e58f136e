//! Three-reel slot machine.
//!
//! The final symbols are drawn when the wager is placed. Until a reel's stop timer fires, every
//! tick shows a fresh random symbol on it; the timer snaps the reel to its final symbol. The
//! spin resolves when the last reel stops.

use wagerhall_types::{
    arcade::{ArcadeConfig, SlotConfig, REEL_COUNT},
    GameType,
};

use super::{invalid, Advance, Context, Event, GameError, Outcome};
use crate::sampler::sample_symbol;
use crate::session::SessionStatus;

/// Reel contents are indices into the configured symbol table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSpin {
    pub result: [usize; REEL_COUNT],
    pub display: [usize; REEL_COUNT],
    pub stopped: [bool; REEL_COUNT],
}

impl SlotSpin {
    pub fn new(result: [usize; REEL_COUNT], display: [usize; REEL_COUNT]) -> Self {
        Self {
            result,
            display,
            stopped: [false; REEL_COUNT],
        }
    }

    pub fn all_stopped(&self) -> bool {
        self.stopped.iter().all(|stopped| *stopped)
    }

    /// Labels currently shown on the reels.
    pub fn displayed_symbols(&self, config: &SlotConfig) -> [String; REEL_COUNT] {
        self.display.map(|index| label(config, index))
    }

    pub fn result_symbols(&self, config: &SlotConfig) -> [String; REEL_COUNT] {
        self.result.map(|index| label(config, index))
    }
}

fn label(config: &SlotConfig, index: usize) -> String {
    config
        .symbols
        .get(index)
        .map(|symbol| symbol.symbol.clone())
        .unwrap_or_default()
}

/// Pay table for a final reel result.
///
/// Three of a kind pays the symbol's multiplier. A pair pays `partial_win_percent` of the wager;
/// with `adjacent_pairs_only` the first and last reel do not form a pair.
pub fn evaluate(result: &[usize; REEL_COUNT], wager: u64, config: &SlotConfig) -> (u64, Outcome) {
    let [first, second, third] = *result;
    if first == second && second == third {
        let multiplier = config
            .symbols
            .get(first)
            .map(|symbol| symbol.multiplier)
            .unwrap_or(0);
        return (wager.saturating_mul(multiplier), Outcome::Won);
    }

    let adjacent = first == second || second == third;
    let split = !config.adjacent_pairs_only && first == third;
    if adjacent || split {
        let amount = (wager as u128 * config.partial_win_percent as u128 / 100) as u64;
        return (amount, Outcome::PartialWin);
    }
    (0, Outcome::Lost)
}

impl Advance for SlotSpin {
    fn advance(&mut self, event: Event, ctx: &mut Context<'_>) -> Result<SessionStatus, GameError> {
        match event {
            Event::Tick => {
                for reel in 0..REEL_COUNT {
                    if self.stopped[reel] {
                        continue;
                    }
                    self.display[reel] = sample_symbol(&ctx.config.slot.symbols, &mut *ctx.rng)
                        .ok_or(GameError::EmptyTable)?;
                }
            }
            Event::StopReel(reel) => {
                if reel >= REEL_COUNT {
                    return Err(GameError::InvalidReel(reel));
                }
                self.stopped[reel] = true;
                self.display[reel] = self.result[reel];
            }
            other => return Err(invalid(GameType::Slot, other)),
        }
        if self.all_stopped() {
            Ok(SessionStatus::Resolved)
        } else {
            Ok(SessionStatus::Active)
        }
    }

    fn settle(&self, wager: u64, config: &ArcadeConfig) -> (u64, Outcome) {
        evaluate(&self.result, wager, &config.slot)
    }
}
