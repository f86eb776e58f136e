//! Playing-card helpers.
//!
//! Cards are encoded as `0..=51`, where:
//! - suit = card / 13 (0..=3)
//! - rank = card % 13 (0..=12)
//!
//! Rank 0 is the Ace and rank 12 the King. Hi-lo compares ranks with the Ace low.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Total cards in a standard deck.
pub const CARDS_PER_DECK: u8 = 52;

/// Ranks per suit.
pub const RANKS_PER_SUIT: u8 = 13;

/// Number of suits.
pub const SUITS: u8 = 4;

const RANK_LABELS: [&str; RANKS_PER_SUIT as usize] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];

const SUIT_LABELS: [&str; SUITS as usize] = ["♠", "♥", "♣", "♦"];

/// A single card. The default card is the Ace of spades.
///
/// Serialized as its deck index; indices outside the deck are rejected on deserialize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    /// Build a card from a 0-based rank (0 = Ace) and a suit (0..=3).
    ///
    /// Returns `None` when either component is out of range.
    pub fn new(rank: u8, suit: u8) -> Option<Self> {
        if rank >= RANKS_PER_SUIT || suit >= SUITS {
            return None;
        }
        Some(Self(suit * RANKS_PER_SUIT + rank))
    }

    pub fn from_index(index: u8) -> Option<Self> {
        (index < CARDS_PER_DECK).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// 0-based rank (0..=12), where 0 is Ace.
    pub fn rank(self) -> u8 {
        self.0 % RANKS_PER_SUIT
    }

    /// Suit (0..=3).
    pub fn suit(self) -> u8 {
        self.0 / RANKS_PER_SUIT
    }

    pub fn rank_label(self) -> &'static str {
        RANK_LABELS[self.rank() as usize]
    }

    /// Parse a rank label such as `"A"`, `"10"` or `"k"` into a 0-based rank.
    pub fn parse_rank(label: &str) -> Option<u8> {
        RANK_LABELS
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(label))
            .map(|rank| rank as u8)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.rank_label(),
            SUIT_LABELS[self.suit() as usize]
        )
    }
}

impl TryFrom<u8> for Card {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Card::from_index(index).ok_or_else(|| format!("card index {index} is outside the deck"))
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.index()
    }
}
