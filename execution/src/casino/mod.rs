//! Game progression state machines.
//!
//! Each game keeps its in-flight progress in one variant of [`GameState`]. The engine feeds
//! events into [`GameState::advance`], which mutates the progress in place and reports whether
//! the session reached its terminal state. Payout math lives next to each game so the resolver
//! only has to dispatch on the variant.

pub mod crash;
pub mod hilo;
pub mod slot;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wagerhall_types::{arcade::ArcadeConfig, GameType};

use crate::sampler::RandomSource;
use crate::session::SessionStatus;

pub use crash::CrashRound;
pub use hilo::{Guess, HiLoOutcome, HiLoRun};
pub use slot::SlotSpin;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{event} does not apply to a {game} session")]
    InvalidMove { game: GameType, event: &'static str },
    #[error("reel {0} does not exist")]
    InvalidReel(usize),
    #[error("configured outcome table is empty")]
    EmptyTable,
}

/// Inputs that move a session forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Periodic host tick.
    Tick,
    /// One-shot timer for a slot reel.
    StopReel(usize),
    Guess(Guess),
    CashOut,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Tick => "tick",
            Event::StopReel(_) => "reel stop",
            Event::Guess(_) => "guess",
            Event::CashOut => "cash-out",
        }
    }
}

/// Everything a game needs while advancing besides its own state.
pub struct Context<'a> {
    pub config: &'a ArcadeConfig,
    pub rng: &'a mut dyn RandomSource,
}

/// How a resolved session paid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    PartialWin,
    CashedOut,
    Lost,
}

/// Per-game progression.
pub trait Advance {
    fn advance(&mut self, event: Event, ctx: &mut Context<'_>) -> Result<SessionStatus, GameError>;

    /// Winnings owed for a terminal state, given the debited wager.
    fn settle(&self, wager: u64, config: &ArcadeConfig) -> (u64, Outcome);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Crash(CrashRound),
    Slot(SlotSpin),
    HiLo(HiLoRun),
}

impl GameState {
    pub fn game_type(&self) -> GameType {
        match self {
            GameState::Crash(_) => GameType::Crash,
            GameState::Slot(_) => GameType::Slot,
            GameState::HiLo(_) => GameType::HiLo,
        }
    }

    pub fn advance(
        &mut self,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Result<SessionStatus, GameError> {
        match self {
            GameState::Crash(round) => round.advance(event, ctx),
            GameState::Slot(spin) => spin.advance(event, ctx),
            GameState::HiLo(run) => run.advance(event, ctx),
        }
    }

    pub fn settle(&self, wager: u64, config: &ArcadeConfig) -> (u64, Outcome) {
        match self {
            GameState::Crash(round) => round.settle(wager, config),
            GameState::Slot(spin) => spin.settle(wager, config),
            GameState::HiLo(run) => run.settle(wager, config),
        }
    }

    /// Whether the periodic tick changes anything for this game.
    pub fn is_ticked(&self) -> bool {
        !matches!(self, GameState::HiLo(_))
    }
}

fn invalid(game: GameType, event: Event) -> GameError {
    GameError::InvalidMove {
        game,
        event: event.name(),
    }
}
