//! Crash: a multiplier climbs one step per tick until it reaches the crash point drawn at
//! wager time. The player wins `floor(wager * target)` when the multiplier got at least as far
//! as the target they picked.

use wagerhall_types::{
    arcade::{apply_multiplier, ArcadeConfig, BASE_MULTIPLIER},
    GameType,
};

use super::{invalid, Advance, Context, Event, GameError, Outcome};
use crate::session::SessionStatus;

/// All multipliers are basis points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrashRound {
    pub target: u64,
    pub crash_point: u64,
    pub current: u64,
    pub step: u64,
}

impl CrashRound {
    /// A round starts at 1.00x.
    pub fn new(target: u64, crash_point: u64, step: u64) -> Self {
        Self {
            target,
            crash_point,
            current: BASE_MULTIPLIER,
            step,
        }
    }

    pub fn has_crashed(&self) -> bool {
        self.current >= self.crash_point
    }
}

/// `floor(wager * target)` when `actual >= target`, otherwise nothing.
pub fn winnings(wager: u64, target: u64, actual: u64) -> u64 {
    if actual >= target {
        apply_multiplier(wager, target)
    } else {
        0
    }
}

impl Advance for CrashRound {
    fn advance(&mut self, event: Event, _ctx: &mut Context<'_>) -> Result<SessionStatus, GameError> {
        match event {
            Event::Tick => {
                if !self.has_crashed() {
                    self.current = self.current.saturating_add(self.step);
                }
                if self.has_crashed() {
                    Ok(SessionStatus::Resolved)
                } else {
                    Ok(SessionStatus::Active)
                }
            }
            other => Err(invalid(GameType::Crash, other)),
        }
    }

    fn settle(&self, wager: u64, _config: &ArcadeConfig) -> (u64, Outcome) {
        match winnings(wager, self.target, self.current) {
            0 => (0, Outcome::Lost),
            amount => (amount, Outcome::Won),
        }
    }
}
