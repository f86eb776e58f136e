//! JSON messages exchanged over the arcade WebSocket.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wagerhall_execution::{
    Guess, GuessOutcome, Settlement, SettlementDetail, WagerEngine, WagerError,
};
use wagerhall_types::{arcade::format_multiplier, PlayerId};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum InboundMessage {
    Crash {
        request_id: String,
        player_id: PlayerId,
        wager: u64,
        target: f64,
    },
    Slot {
        request_id: String,
        player_id: PlayerId,
        wager: u64,
    },
    Hilo {
        request_id: String,
        player_id: PlayerId,
        wager: u64,
    },
    Higher {
        request_id: String,
        player_id: PlayerId,
    },
    Lower {
        request_id: String,
        player_id: PlayerId,
    },
    Equal {
        request_id: String,
        player_id: PlayerId,
    },
    Cashout {
        request_id: String,
        player_id: PlayerId,
    },
    Balance {
        request_id: String,
        player_id: PlayerId,
    },
}

impl InboundMessage {
    pub fn player(&self) -> &PlayerId {
        match self {
            InboundMessage::Crash { player_id, .. }
            | InboundMessage::Slot { player_id, .. }
            | InboundMessage::Hilo { player_id, .. }
            | InboundMessage::Higher { player_id, .. }
            | InboundMessage::Lower { player_id, .. }
            | InboundMessage::Equal { player_id, .. }
            | InboundMessage::Cashout { player_id, .. }
            | InboundMessage::Balance { player_id, .. } => player_id,
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            InboundMessage::Crash { request_id, .. }
            | InboundMessage::Slot { request_id, .. }
            | InboundMessage::Hilo { request_id, .. }
            | InboundMessage::Higher { request_id, .. }
            | InboundMessage::Lower { request_id, .. }
            | InboundMessage::Equal { request_id, .. }
            | InboundMessage::Cashout { request_id, .. }
            | InboundMessage::Balance { request_id, .. } => request_id,
        }
    }
}

/// Direct reply to one inbound message. Game progress arrives separately as engine events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OutboundResponse {
    Ack {
        request_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        session_id: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        winnings: Option<u64>,
    },
    GuessResult {
        request_id: String,
        correct: bool,
        drawn: String,
        streak: u32,
        multiplier: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        winnings: Option<u64>,
    },
    Balance {
        request_id: String,
        balance: u64,
    },
    Error {
        request_id: String,
        code: String,
        message: String,
    },
}

impl OutboundResponse {
    pub fn error(request_id: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        OutboundResponse::Error {
            request_id: request_id.into(),
            code: code.to_string(),
            message: message.into(),
        }
    }

    fn from_error(request_id: String, err: &WagerError) -> Self {
        Self::error(request_id, err.code(), err.to_string())
    }

    fn settled(request_id: String, settlement: &Settlement) -> Self {
        OutboundResponse::Ack {
            request_id,
            session_id: Some(settlement.session_id),
            winnings: Some(settlement.winnings),
        }
    }
}

/// Run one inbound command against the engine.
pub fn respond(engine: &Arc<WagerEngine>, inbound: InboundMessage) -> OutboundResponse {
    let request_id = inbound.request_id().to_string();
    match dispatch(engine, inbound) {
        Ok(response) => response,
        Err(err) => OutboundResponse::from_error(request_id, &err),
    }
}

fn dispatch(
    engine: &Arc<WagerEngine>,
    inbound: InboundMessage,
) -> Result<OutboundResponse, WagerError> {
    let started = |request_id: String, session_id: u64| OutboundResponse::Ack {
        request_id,
        session_id: Some(session_id),
        winnings: None,
    };
    match inbound {
        InboundMessage::Crash {
            request_id,
            player_id,
            wager,
            target,
        } => {
            let session = engine.start_crash(&player_id, wager, target)?;
            Ok(started(request_id, session.id))
        }
        InboundMessage::Slot {
            request_id,
            player_id,
            wager,
        } => {
            let session = engine.start_slot(&player_id, wager)?;
            Ok(started(request_id, session.id))
        }
        InboundMessage::Hilo {
            request_id,
            player_id,
            wager,
        } => {
            let session = engine.start_hilo(&player_id, wager)?;
            Ok(started(request_id, session.id))
        }
        InboundMessage::Higher {
            request_id,
            player_id,
        } => guess(engine, request_id, &player_id, Guess::Higher),
        InboundMessage::Lower {
            request_id,
            player_id,
        } => guess(engine, request_id, &player_id, Guess::Lower),
        InboundMessage::Equal {
            request_id,
            player_id,
        } => guess(engine, request_id, &player_id, Guess::Equal),
        InboundMessage::Cashout {
            request_id,
            player_id,
        } => {
            let settlement = engine.cash_out(&player_id)?;
            Ok(OutboundResponse::settled(request_id, &settlement))
        }
        InboundMessage::Balance {
            request_id,
            player_id,
        } => Ok(OutboundResponse::Balance {
            request_id,
            balance: engine.balance(&player_id)?,
        }),
    }
}

fn guess(
    engine: &Arc<WagerEngine>,
    request_id: String,
    player: &PlayerId,
    guess: Guess,
) -> Result<OutboundResponse, WagerError> {
    let response = match engine.guess(player, guess)? {
        GuessOutcome::Correct {
            drawn,
            streak,
            multiplier,
        } => OutboundResponse::GuessResult {
            request_id,
            correct: true,
            drawn: drawn.to_string(),
            streak,
            multiplier: format_multiplier(multiplier),
            winnings: None,
        },
        GuessOutcome::Busted { drawn, settlement } => {
            let (streak, multiplier) = match &settlement.detail {
                SettlementDetail::HiLo {
                    streak, multiplier, ..
                } => (*streak, *multiplier),
                _ => (0, 0),
            };
            OutboundResponse::GuessResult {
                request_id,
                correct: false,
                drawn: drawn.to_string(),
                streak,
                multiplier: format_multiplier(multiplier),
                winnings: Some(settlement.winnings),
            }
        }
    };
    Ok(response)
}
