use std::time::Instant;

use serde::{Deserialize, Serialize};
use wagerhall_types::{GameType, PlayerId};

use crate::casino::GameState;

/// Process-unique, monotonically assigned session identifier.
pub type SessionId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    /// Terminal. Set by the step that ends the session, which also takes it out of the store.
    Resolved,
}

/// One wager in flight. The wager has already been debited when a session exists.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub player: PlayerId,
    pub wager: u64,
    pub game: GameState,
    pub status: SessionStatus,
    pub created_at: Instant,
}

impl Session {
    pub fn new(id: SessionId, player: PlayerId, wager: u64, game: GameState) -> Self {
        Self {
            id,
            player,
            wager,
            game,
            status: SessionStatus::Active,
            created_at: Instant::now(),
        }
    }

    pub fn game_type(&self) -> GameType {
        self.game.game_type()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Crash target multiplier in basis points; other games have none.
    pub fn target(&self) -> Option<u64> {
        match &self.game {
            GameState::Crash(round) => Some(round.target),
            _ => None,
        }
    }
}
