//! Cards shared by the hand evaluator, the table engine, and the deck oracle
//! client. A 52-card deck contains each `(Rank, Suit)` combination exactly
//! once.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 2..=14, where 14 is the Ace (Ace is always high outside the wheel).
pub type Rank = u8;

/// 1-based position in the canonical 52-card deck (1..=52), the wire format
/// the deck oracle speaks in.
pub type Index = u8;

pub const LOWEST_RANK: Rank = 2;
pub const ACE: Rank = 14;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Clubs = 0,
    Diamonds = 1,
    Hearts = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => Suit::Clubs,
            1 => Suit::Diamonds,
            2 => Suit::Hearts,
            3 => Suit::Spades,
            other => panic!("invalid suit value: {other}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        debug_assert!((LOWEST_RANK..=ACE).contains(&rank), "rank out of range");
        Self { rank, suit }
    }

    /// Deterministic 1..=52 -> Card mapping (suit-major, rank-minor).
    pub fn from_index(index: Index) -> Self {
        assert!((1..=52).contains(&index), "index out of range: {index}");
        let zero_based = index - 1;
        let suit = Suit::from_u8(zero_based / 13);
        let rank = (zero_based % 13) + LOWEST_RANK;
        Card { rank, suit }
    }

    pub fn to_index(self) -> Index {
        13 * self.suit.as_u8() + (self.rank - LOWEST_RANK) + 1
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const RANKS: [&str; 13] = [
            "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K", "A",
        ];
        const SUITS: [&str; 4] = ["c", "d", "h", "s"];
        write!(
            f,
            "{}{}",
            RANKS[(self.rank - LOWEST_RANK) as usize],
            SUITS[self.suit.as_u8() as usize]
        )
    }
}

/// A standard 52-card deck, each combination exactly once, in canonical
/// (suit-major, rank-minor) index order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(52);
    for suit in Suit::ALL {
        for rank in LOWEST_RANK..=ACE {
            deck.push(Card::new(rank, suit));
        }
    }
    deck
}

/// Sort descending by rank, ties broken by suit descending — the canonical
/// order the hand evaluator works against.
pub fn sort_desc(cards: &mut [Card]) {
    cards.sort_by(|a, b| match b.rank.cmp(&a.rank) {
        Ordering::Equal => b.suit.cmp(&a.suit),
        ord => ord,
    });
}
