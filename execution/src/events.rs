//! Display events emitted while sessions progress.

use serde::Serialize;
use wagerhall_types::{Card, GameType, PlayerId};

use crate::payout::Settlement;
use crate::session::SessionId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    WagerPlaced {
        player: PlayerId,
        session_id: SessionId,
        game: GameType,
        wager: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        target: Option<u64>,
    },
    /// Crash multiplier after a tick, in basis points.
    CrashProgress {
        player: PlayerId,
        session_id: SessionId,
        multiplier: u64,
        crashed: bool,
    },
    SlotReels {
        player: PlayerId,
        session_id: SessionId,
        reels: [String; 3],
        stopped: [bool; 3],
    },
    /// Card in play after the deal or a correct guess.
    HiLoCard {
        player: PlayerId,
        session_id: SessionId,
        card: Card,
        streak: u32,
        multiplier: u64,
    },
    Settled(Settlement),
    /// Winnings were computed but the ledger refused the credit.
    CreditFailed {
        player: PlayerId,
        session_id: SessionId,
        amount: u64,
        reason: String,
    },
}

impl GameEvent {
    pub fn player(&self) -> &PlayerId {
        match self {
            GameEvent::WagerPlaced { player, .. }
            | GameEvent::CrashProgress { player, .. }
            | GameEvent::SlotReels { player, .. }
            | GameEvent::HiLoCard { player, .. }
            | GameEvent::CreditFailed { player, .. } => player,
            GameEvent::Settled(settlement) => &settlement.player,
        }
    }
}

/// Receives events from the engine. Publishing must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: GameEvent);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: GameEvent) {}
}
