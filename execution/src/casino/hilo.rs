//! Hi-lo: guess whether the next card ranks higher, lower or equal.
//!
//! Cards are drawn with replacement and compared by rank only, Ace low and King high. A tie
//! loses a higher/lower guess. Each correct guess grows the running multiplier (basis points):
//!
//! - higher/lower: `* (1.20 + 0.05 * streak)` and then by the long-shot bonus
//! - equal: `* 10`
//!
//! The bonus depends on how many ranks would have won from the card shown before the draw:
//! one rank pays 2.0x, two 1.5x, three 1.3x, anything else 1.0x. Every product floors to a
//! whole basis point.

use serde::{Deserialize, Serialize};
use wagerhall_types::{
    arcade::{
        apply_multiplier, ArcadeConfig, BASE_MULTIPLIER, HILO_EQUAL_MULTIPLIER, HILO_STREAK_BASE,
        HILO_STREAK_STEP, RANKS_PER_SUIT,
    },
    Card, GameType,
};

use super::{invalid, Advance, Context, Event, GameError, Outcome};
use crate::sampler::draw_card;
use crate::session::SessionStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Guess {
    Higher,
    Lower,
    Equal,
}

impl Guess {
    /// Whether `drawn` wins against `current` for this guess.
    pub fn wins(self, current: Card, drawn: Card) -> bool {
        match self {
            Guess::Higher => drawn.rank() > current.rank(),
            Guess::Lower => drawn.rank() < current.rank(),
            Guess::Equal => drawn.rank() == current.rank(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiLoOutcome {
    CashedOut,
    Busted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HiLoRun {
    pub card: Card,
    pub streak: u32,
    /// Running multiplier in basis points.
    pub multiplier: u64,
    /// The most recent draw, including the one that ended the run.
    pub last_draw: Option<Card>,
    pub outcome: Option<HiLoOutcome>,
}

impl HiLoRun {
    pub fn new(card: Card) -> Self {
        Self {
            card,
            streak: 0,
            multiplier: BASE_MULTIPLIER,
            last_draw: None,
            outcome: None,
        }
    }

    fn apply_guess(&mut self, guess: Guess, drawn: Card) -> SessionStatus {
        self.last_draw = Some(drawn);
        if !guess.wins(self.card, drawn) {
            self.outcome = Some(HiLoOutcome::Busted);
            return SessionStatus::Resolved;
        }

        self.streak = self.streak.saturating_add(1);
        self.multiplier = match guess {
            Guess::Equal => apply_multiplier(self.multiplier, HILO_EQUAL_MULTIPLIER),
            Guess::Higher | Guess::Lower => {
                let growth = HILO_STREAK_BASE
                    .saturating_add(HILO_STREAK_STEP.saturating_mul(self.streak as u64));
                let grown = apply_multiplier(self.multiplier, growth);
                apply_multiplier(grown, bonus_bps(self.card, guess))
            }
        };
        self.card = drawn;
        SessionStatus::Active
    }
}

/// Long-shot bonus for a higher/lower guess from `current`, in basis points.
pub fn bonus_bps(current: Card, guess: Guess) -> u64 {
    let rank = current.rank() as u64;
    let options = match guess {
        Guess::Higher => (RANKS_PER_SUIT as u64 - 1) - rank,
        Guess::Lower => rank,
        Guess::Equal => return BASE_MULTIPLIER,
    };
    match options {
        1 => 20_000,
        2 => 15_000,
        3 => 13_000,
        _ => BASE_MULTIPLIER,
    }
}

impl Advance for HiLoRun {
    fn advance(&mut self, event: Event, ctx: &mut Context<'_>) -> Result<SessionStatus, GameError> {
        if self.outcome.is_some() {
            return Err(invalid(GameType::HiLo, event));
        }
        match event {
            Event::Tick => Ok(SessionStatus::Active),
            Event::Guess(guess) => {
                let drawn = draw_card(&mut *ctx.rng);
                Ok(self.apply_guess(guess, drawn))
            }
            Event::CashOut => {
                self.outcome = Some(HiLoOutcome::CashedOut);
                Ok(SessionStatus::Resolved)
            }
            other => Err(invalid(GameType::HiLo, other)),
        }
    }

    fn settle(&self, wager: u64, _config: &ArcadeConfig) -> (u64, Outcome) {
        match self.outcome {
            Some(HiLoOutcome::CashedOut) => {
                (apply_multiplier(wager, self.multiplier), Outcome::CashedOut)
            }
            Some(HiLoOutcome::Busted) | None => (0, Outcome::Lost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedRng;

    fn card(label: &str, suit: u8) -> Card {
        let rank = Card::parse_rank(label).expect("rank label");
        Card::new(rank, suit).expect("card")
    }

    fn guess(run: &mut HiLoRun, guess: Guess, drawn: Card) -> SessionStatus {
        let config = ArcadeConfig::default();
        let mut rng = ScriptedRng::default();
        rng.push_card(drawn);
        let mut ctx = Context {
            config: &config,
            rng: &mut rng,
        };
        run.advance(Event::Guess(guess), &mut ctx).expect("guess applies")
    }

    #[test]
    fn test_higher_from_five_draws_nine() {
        let mut run = HiLoRun::new(card("5", 0));
        assert_eq!(
            guess(&mut run, Guess::Higher, card("9", 1)),
            SessionStatus::Active
        );
        assert_eq!(run.streak, 1);
        // 1.20 + 0.05, no bonus with eight higher ranks.
        assert_eq!(run.multiplier, 12_500);
        assert_eq!(run.card, card("9", 1));

        let mut ctx_rng = ScriptedRng::default();
        let config = ArcadeConfig::default();
        let mut ctx = Context {
            config: &config,
            rng: &mut ctx_rng,
        };
        assert_eq!(
            run.advance(Event::CashOut, &mut ctx),
            Ok(SessionStatus::Resolved)
        );
        assert_eq!(run.settle(100, &config), (125, Outcome::CashedOut));
    }

    #[test]
    fn test_tie_loses_higher_and_lower() {
        let mut run = HiLoRun::new(card("7", 0));
        assert_eq!(
            guess(&mut run, Guess::Higher, card("7", 2)),
            SessionStatus::Resolved
        );
        assert_eq!(run.outcome, Some(HiLoOutcome::Busted));
        assert_eq!(run.last_draw, Some(card("7", 2)));
        assert_eq!(run.settle(100, &ArcadeConfig::default()), (0, Outcome::Lost));

        let mut run = HiLoRun::new(card("7", 0));
        assert_eq!(
            guess(&mut run, Guess::Lower, card("7", 3)),
            SessionStatus::Resolved
        );
    }

    #[test]
    fn test_equal_multiplies_by_ten() {
        let mut run = HiLoRun::new(card("Q", 0));
        assert_eq!(
            guess(&mut run, Guess::Equal, card("Q", 3)),
            SessionStatus::Active
        );
        assert_eq!(run.multiplier, 100_000);
        assert_eq!(run.streak, 1);
    }

    #[test]
    fn test_ace_is_low_and_king_is_high() {
        let mut run = HiLoRun::new(card("A", 0));
        assert_eq!(
            guess(&mut run, Guess::Lower, card("K", 0)),
            SessionStatus::Resolved
        );

        let mut run = HiLoRun::new(card("K", 0));
        assert_eq!(
            guess(&mut run, Guess::Lower, card("A", 0)),
            SessionStatus::Active
        );
    }

    #[test]
    fn test_bonus_for_long_shots() {
        assert_eq!(bonus_bps(card("Q", 0), Guess::Higher), 20_000);
        assert_eq!(bonus_bps(card("J", 0), Guess::Higher), 15_000);
        assert_eq!(bonus_bps(card("10", 0), Guess::Higher), 13_000);
        assert_eq!(bonus_bps(card("9", 0), Guess::Higher), BASE_MULTIPLIER);
        assert_eq!(bonus_bps(card("K", 0), Guess::Higher), BASE_MULTIPLIER);
        assert_eq!(bonus_bps(card("2", 0), Guess::Lower), 20_000);
        assert_eq!(bonus_bps(card("A", 0), Guess::Lower), BASE_MULTIPLIER);

        // Q -> K higher: 1.25 * 2.0 = 2.50x
        let mut run = HiLoRun::new(card("Q", 0));
        guess(&mut run, Guess::Higher, card("K", 0));
        assert_eq!(run.multiplier, 25_000);
    }

    #[test]
    fn test_streak_grows_multiplier() {
        let mut run = HiLoRun::new(card("5", 0));
        guess(&mut run, Guess::Higher, card("9", 0));
        // Second correct guess: 1.25 * 1.30 = 1.625, then no bonus from 9 going lower.
        guess(&mut run, Guess::Lower, card("3", 0));
        assert_eq!(run.streak, 2);
        assert_eq!(run.multiplier, 16_250);
        assert_eq!(run.settle(40, &ArcadeConfig::default()).0, 0);
    }

    #[test]
    fn test_cash_out_without_guesses_returns_wager() {
        let config = ArcadeConfig::default();
        let mut rng = ScriptedRng::default();
        let mut ctx = Context {
            config: &config,
            rng: &mut rng,
        };
        let mut run = HiLoRun::new(card("8", 0));
        assert_eq!(run.advance(Event::Tick, &mut ctx), Ok(SessionStatus::Active));
        run.advance(Event::CashOut, &mut ctx).expect("cash out");
        assert_eq!(run.settle(100, &config), (100, Outcome::CashedOut));
        assert!(run.advance(Event::CashOut, &mut ctx).is_err());
    }
}
