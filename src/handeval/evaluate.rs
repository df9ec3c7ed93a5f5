use super::{compare, HandEvalError, HandEvaluation, HandRanking};
use crate::cards::{sort_desc, Card, Suit, ACE};

/// `evaluate(cards: [Card], 5 ≤ |cards| ≤ 7) → HandEvaluation`.
///
/// Enumerates every 5-card subset of the input (C(5,5)=1 .. C(7,5)=21),
/// classifies each, and keeps the highest-ranked one — "when 7 cards yield
/// multiple candidate flushes or straights, pick the highest-ranked five"
/// falls out of this for free.
pub fn evaluate(cards: &[Card]) -> Result<HandEvaluation, HandEvalError> {
    if !(5..=7).contains(&cards.len()) {
        return Err(HandEvalError::InvalidInput(cards.len()));
    }

    let mut best: Option<HandEvaluation> = None;
    for combo in combinations_of_5(cards) {
        let candidate = classify_five(combo);
        best = Some(match best {
            None => candidate,
            Some(current) => {
                if compare(&candidate, &current) == std::cmp::Ordering::Greater {
                    candidate
                } else {
                    current
                }
            }
        });
    }
    Ok(best.expect("at least one 5-card combination exists"))
}

fn combinations_of_5(cards: &[Card]) -> Vec<[Card; 5]> {
    let n = cards.len();
    let mut out = Vec::new();
    let mut idx = [0usize; 5];
    for a in 0..n {
        idx[0] = a;
        for b in (a + 1)..n {
            idx[1] = b;
            for c in (b + 1)..n {
                idx[2] = c;
                for d in (c + 1)..n {
                    idx[3] = d;
                    for e in (d + 1)..n {
                        idx[4] = e;
                        out.push([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
    out
}

/// Classify exactly 5 cards, top-down from best category to worst, and
/// build the ranked `HandEvaluation` (high card + kickers) for comparison.
fn classify_five(mut hand: [Card; 5]) -> HandEvaluation {
    sort_desc(&mut hand);

    let mut counts = [0u8; 15]; // indexed by rank, 2..=14
    for c in hand {
        counts[c.rank as usize] += 1;
    }

    let same_suit = hand.iter().all(|c| c.suit == hand[0].suit);
    let mut distinct_ranks: Vec<u8> = hand.iter().map(|c| c.rank).collect();
    distinct_ranks.dedup();

    let straight_high = if distinct_ranks.len() == 5 {
        if is_consecutive_desc(&distinct_ranks) {
            Some(distinct_ranks[0])
        } else if is_wheel(&distinct_ranks) {
            Some(5) // wheel: A-2-3-4-5, ranked as a 5-high straight
        } else {
            None
        }
    } else {
        None
    };

    if let (true, Some(high)) = (same_suit, straight_high) {
        let ranking = HandRanking::StraightFlush;
        let high_card = find_card(&hand, high);
        return finish(ranking, hand, high_card, vec![]);
    }

    if let Some(quad_rank) = (2..=ACE).rev().find(|&r| counts[r as usize] == 4) {
        let kicker = hand.iter().find(|c| c.rank != quad_rank).copied().unwrap();
        return finish(
            HandRanking::FourOfAKind,
            hand,
            find_card(&hand, quad_rank),
            vec![kicker],
        );
    }

    if let Some(trip_rank) = (2..=ACE).rev().find(|&r| counts[r as usize] == 3) {
        if let Some(pair_rank) = (2..=ACE)
            .rev()
            .find(|&r| r != trip_rank && counts[r as usize] >= 2)
        {
            let pair_card = find_card(&hand, pair_rank);
            return finish(
                HandRanking::FullHouse,
                hand,
                find_card(&hand, trip_rank),
                vec![pair_card],
            );
        }
    }

    if same_suit {
        let high_card = hand[0];
        let kickers = hand[1..].to_vec();
        return finish(HandRanking::Flush, hand, high_card, kickers);
    }

    if let Some(high) = straight_high {
        return finish(HandRanking::Straight, hand, find_card(&hand, high), vec![]);
    }

    if let Some(trip_rank) = (2..=ACE).rev().find(|&r| counts[r as usize] == 3) {
        let kickers: Vec<Card> = hand.iter().filter(|c| c.rank != trip_rank).copied().collect();
        return finish(
            HandRanking::ThreeOfAKind,
            hand,
            find_card(&hand, trip_rank),
            kickers,
        );
    }

    let pair_ranks: Vec<u8> = (2..=ACE).rev().filter(|&r| counts[r as usize] == 2).collect();
    if pair_ranks.len() >= 2 {
        let high_pair = pair_ranks[0];
        let low_pair = pair_ranks[1];
        let kicker = hand
            .iter()
            .find(|c| c.rank != high_pair && c.rank != low_pair)
            .copied()
            .unwrap();
        return finish(
            HandRanking::TwoPair,
            hand,
            find_card(&hand, high_pair),
            vec![find_card(&hand, low_pair), kicker],
        );
    }

    if let Some(pair_rank) = pair_ranks.first().copied() {
        let kickers: Vec<Card> = hand.iter().filter(|c| c.rank != pair_rank).copied().collect();
        return finish(HandRanking::Pair, hand, find_card(&hand, pair_rank), kickers);
    }

    finish(HandRanking::HighCard, hand, hand[0], hand[1..].to_vec())
}

fn finish(
    ranking: HandRanking,
    five_cards: [Card; 5],
    high_card: Card,
    kickers: Vec<Card>,
) -> HandEvaluation {
    let description = ranking.description(high_card.rank);
    HandEvaluation {
        ranking,
        five_cards,
        high_card,
        kickers,
        description,
    }
}

/// Picks a representative card of `rank` out of the hand (suit is
/// irrelevant to comparison; only used for display/auditing).
fn find_card(hand: &[Card; 5], rank: u8) -> Card {
    hand.iter().find(|c| c.rank == rank).copied().unwrap_or(Card::new(rank, Suit::Spades))
}

fn is_consecutive_desc(ranks: &[u8]) -> bool {
    ranks.windows(2).all(|w| w[0] == w[1] + 1)
}

/// A-2-3-4-5 with ranks sorted descending is `[14, 5, 4, 3, 2]`.
fn is_wheel(ranks: &[u8]) -> bool {
    ranks == [ACE, 5, 4, 3, 2]
}
