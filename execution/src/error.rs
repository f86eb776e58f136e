use thiserror::Error;
use wagerhall_types::{arcade::format_multiplier, GameType, PlayerId};

use crate::casino::GameError;
use crate::ledger::LedgerError;
use crate::payout::Settlement;

fn multiplier(bps: &u64) -> String {
    format_multiplier(*bps)
}

/// Rejected wager input. Nothing has been mutated when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wager must be a positive amount")]
    ZeroWager,
    #[error("wager {amount} is below the minimum of {min}")]
    BelowMinimum { amount: u64, min: u64 },
    #[error("wager {amount} is above the maximum of {max}")]
    AboveMaximum { amount: u64, max: u64 },
    #[error("target multiplier is not a number")]
    InvalidTarget,
    #[error(
        "target multiplier {}x must be between {}x and {}x",
        multiplier(.target),
        multiplier(.min),
        multiplier(.max)
    )]
    TargetOutOfRange { target: u64, min: u64, max: u64 },
    #[error("balance of {balance} cannot cover a wager of {wager}")]
    InsufficientBalance { balance: u64, wager: u64 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WagerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("wagers are on cooldown for another {remaining_secs}s")]
    CooldownActive { remaining_secs: u64 },
    #[error("{player} already has an active {game} session")]
    SessionConflict { player: PlayerId, game: GameType },
    #[error("{player} has no active {expected} session")]
    NoActiveSession { player: PlayerId, expected: GameType },
    #[error("{player} is playing {actual}, not {expected}")]
    WrongGame {
        player: PlayerId,
        expected: GameType,
        actual: GameType,
    },
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("ledger rejected the wager: {0}")]
    Ledger(#[from] LedgerError),
    #[error(
        "credit of {} to {} failed: {source}",
        .settlement.winnings,
        .settlement.player
    )]
    CreditFailed {
        settlement: Box<Settlement>,
        source: LedgerError,
    },
}

impl WagerError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            WagerError::Validation(ValidationError::InsufficientBalance { .. }) => {
                "INSUFFICIENT_BALANCE"
            }
            WagerError::Validation(_) => "INVALID_WAGER",
            WagerError::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            WagerError::SessionConflict { .. } => "SESSION_CONFLICT",
            WagerError::NoActiveSession { .. } => "NO_ACTIVE_SESSION",
            WagerError::WrongGame { .. } => "WRONG_GAME",
            WagerError::Game(_) => "INVALID_MOVE",
            WagerError::Ledger(_) => "LEDGER_ERROR",
            WagerError::CreditFailed { .. } => "CREDIT_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_render_multipliers() {
        let err = WagerError::from(ValidationError::TargetOutOfRange {
            target: 105_000,
            min: 11_000,
            max: 99_000,
        });
        assert_eq!(
            err.to_string(),
            "target multiplier 10.50x must be between 1.10x and 9.90x"
        );
        assert_eq!(err.code(), "INVALID_WAGER");
    }

    #[test]
    fn test_codes_are_distinct_per_variant() {
        let player = PlayerId::from("alice");
        let errors = [
            WagerError::CooldownActive { remaining_secs: 3 },
            WagerError::SessionConflict {
                player: player.clone(),
                game: GameType::Crash,
            },
            WagerError::NoActiveSession {
                player: player.clone(),
                expected: GameType::HiLo,
            },
            WagerError::Ledger(LedgerError::Unavailable("down".into())),
            WagerError::from(ValidationError::InsufficientBalance {
                balance: 5,
                wager: 10,
            }),
        ];
        let codes: Vec<_> = errors.iter().map(WagerError::code).collect();
        assert_eq!(
            codes,
            [
                "COOLDOWN_ACTIVE",
                "SESSION_CONFLICT",
                "NO_ACTIVE_SESSION",
                "LEDGER_ERROR",
                "INSUFFICIENT_BALANCE"
            ]
        );
        assert_eq!(
            errors[0].to_string(),
            "wagers are on cooldown for another 3s"
        );
    }
}
