//! Five-to-seven card poker hand ranking and comparison: rank 5-card
//! subsets by category then a fixed tie-break vector, packed into a
//! single comparable score. No zero-knowledge scoring here — nothing
//! downstream of this crate proves a hand result in zero knowledge —
//! just the category detection and tie-break logic.

mod evaluate;

#[cfg(test)]
mod tests;

pub use evaluate::evaluate;

use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// Totally ordered hand category, High Card lowest, Royal Flush highest.
/// A royal flush is represented as `StraightFlush` with a high card of Ace;
/// there is no separate discriminant.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandRanking {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandRanking {
    pub fn description(self, high_card_rank: u8) -> String {
        match self {
            HandRanking::StraightFlush if high_card_rank == crate::cards::ACE => {
                "Royal Flush".to_string()
            }
            HandRanking::StraightFlush => "Straight Flush".to_string(),
            HandRanking::FourOfAKind => "Four of a Kind".to_string(),
            HandRanking::FullHouse => "Full House".to_string(),
            HandRanking::Flush => "Flush".to_string(),
            HandRanking::Straight => "Straight".to_string(),
            HandRanking::ThreeOfAKind => "Three of a Kind".to_string(),
            HandRanking::TwoPair => "Two Pair".to_string(),
            HandRanking::Pair => "Pair".to_string(),
            HandRanking::HighCard => "High Card".to_string(),
        }
    }
}

/// `{ranking, five_cards, high_card, kickers[], description}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandEvaluation {
    pub ranking: HandRanking,
    pub five_cards: [Card; 5],
    pub high_card: Card,
    /// Remaining tie-break cards in declared (most- to least-significant)
    /// order, after the cards already captured by `high_card`.
    pub kickers: Vec<Card>,
    pub description: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandEvalError {
    #[error("hand evaluation requires 5 to 7 cards, got {0}")]
    InvalidInput(usize),
}

/// Total order: ranking, then high card, then kickers in declared order.
/// A missing kicker compares lower than a present one.
pub fn compare(a: &HandEvaluation, b: &HandEvaluation) -> Ordering {
    match a.ranking.cmp(&b.ranking) {
        Ordering::Equal => {}
        ord => return ord,
    }
    match a.high_card.rank.cmp(&b.high_card.rank) {
        Ordering::Equal => {}
        ord => return ord,
    }
    for i in 0..a.kickers.len().max(b.kickers.len()) {
        let ak = a.kickers.get(i).map(|c| c.rank);
        let bk = b.kickers.get(i).map(|c| c.rank);
        match ak.cmp(&bk) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}
