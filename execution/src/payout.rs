//! Settlement of resolved sessions.
//!
//! The progression step that reaches a terminal state flips the session to `Resolved` and takes
//! it out of the store under its entry lock. That caller owns the session and is the only one to
//! reach [`PayoutResolver::resolve`] for it, which credits the ledger with no lock held.

use std::sync::Arc;

use serde::Serialize;
use wagerhall_types::{arcade::ArcadeConfig, Card, GameType, PlayerId};

use crate::casino::{GameState, Outcome};
use crate::error::WagerError;
use crate::ledger::{CreditLedger, LedgerError};
use crate::session::{Session, SessionId};

/// Largest amount a single ledger credit can carry.
pub const MAX_WINNINGS: u64 = i64::MAX as u64;

/// Final result of one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub session_id: SessionId,
    pub player: PlayerId,
    pub game: GameType,
    pub wager: u64,
    pub winnings: u64,
    pub outcome: Outcome,
    pub detail: SettlementDetail,
}

impl Settlement {
    /// Winnings minus the wager debited at the start.
    pub fn profit(&self) -> i64 {
        let winnings = i64::try_from(self.winnings).unwrap_or(i64::MAX);
        let wager = i64::try_from(self.wager).unwrap_or(i64::MAX);
        winnings.saturating_sub(wager)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementDetail {
    Crash {
        target: u64,
        actual: u64,
    },
    Slot {
        symbols: [String; 3],
    },
    HiLo {
        streak: u32,
        multiplier: u64,
        card: Card,
        last_draw: Option<Card>,
    },
}

/// Compute the settlement for a terminal session. Winnings are capped at [`MAX_WINNINGS`].
pub fn settle(session: &Session, config: &ArcadeConfig) -> Settlement {
    let (winnings, outcome) = session.game.settle(session.wager, config);
    let winnings = winnings.min(MAX_WINNINGS);
    let detail = match &session.game {
        GameState::Crash(round) => SettlementDetail::Crash {
            target: round.target,
            actual: round.current,
        },
        GameState::Slot(spin) => SettlementDetail::Slot {
            symbols: spin.result_symbols(&config.slot),
        },
        GameState::HiLo(run) => SettlementDetail::HiLo {
            streak: run.streak,
            multiplier: run.multiplier,
            card: run.card,
            last_draw: run.last_draw,
        },
    };
    Settlement {
        session_id: session.id,
        player: session.player.clone(),
        game: session.game_type(),
        wager: session.wager,
        winnings,
        outcome,
        detail,
    }
}

pub struct PayoutResolver {
    config: Arc<ArcadeConfig>,
    ledger: Arc<dyn CreditLedger>,
}

impl PayoutResolver {
    pub fn new(config: Arc<ArcadeConfig>, ledger: Arc<dyn CreditLedger>) -> Self {
        Self { config, ledger }
    }

    /// Pay out a session that has been resolved and taken out of the store.
    ///
    /// Zero winnings skip the ledger entirely. A failed credit is returned with the settlement
    /// and never retried.
    pub fn resolve(&self, session: Session) -> Result<Settlement, WagerError> {
        let settlement = settle(&session, &self.config);
        if settlement.winnings > 0 {
            let credit = i64::try_from(settlement.winnings).map_err(|_| {
                LedgerError::Unavailable(format!("credit of {} overflows", settlement.winnings))
            });
            if let Err(source) = credit.and_then(|delta| self.ledger.adjust(&session.player, delta))
            {
                return Err(WagerError::CreditFailed {
                    settlement: Box::new(settlement),
                    source,
                });
            }
        }
        Ok(settlement)
    }
}
