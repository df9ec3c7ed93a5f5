use super::*;
use crate::cards::{Card, Suit};
use std::cmp::Ordering;

fn c(rank: u8, suit: Suit) -> Card {
    Card::new(rank, suit)
}

#[test]
fn rejects_out_of_range_card_counts() {
    let four = [
        c(2, Suit::Clubs),
        c(3, Suit::Clubs),
        c(4, Suit::Clubs),
        c(5, Suit::Clubs),
    ];
    assert_eq!(evaluate(&four), Err(HandEvalError::InvalidInput(4)));

    let eight = vec![c(2, Suit::Clubs); 8];
    assert_eq!(evaluate(&eight), Err(HandEvalError::InvalidInput(8)));
}

/// S6: wheel vs six-high straight — both straights, six-high wins.
#[test]
fn wheel_loses_to_six_high_straight() {
    let wheel = [
        c(ACE, Suit::Spades),
        c(2, Suit::Hearts),
        c(3, Suit::Diamonds),
        c(4, Suit::Clubs),
        c(5, Suit::Spades),
    ];
    let six_high = [
        c(2, Suit::Hearts),
        c(3, Suit::Diamonds),
        c(4, Suit::Clubs),
        c(5, Suit::Spades),
        c(6, Suit::Clubs),
    ];

    let wheel_eval = evaluate(&wheel).unwrap();
    let six_high_eval = evaluate(&six_high).unwrap();

    assert_eq!(wheel_eval.ranking, HandRanking::Straight);
    assert_eq!(six_high_eval.ranking, HandRanking::Straight);
    assert_eq!(compare(&six_high_eval, &wheel_eval), Ordering::Greater);
    assert_eq!(wheel_eval.high_card.rank, 5);
    assert_eq!(six_high_eval.high_card.rank, 6);
}

#[test]
fn duplicate_ranks_across_suits_do_not_form_a_straight() {
    // 5,5,6,7,8 of mixed suits: a pair blocks the straight.
    let hand = [
        c(5, Suit::Clubs),
        c(5, Suit::Hearts),
        c(6, Suit::Diamonds),
        c(7, Suit::Spades),
        c(8, Suit::Clubs),
    ];
    let eval = evaluate(&hand).unwrap();
    assert_eq!(eval.ranking, HandRanking::Pair);
}

#[test]
fn royal_flush_is_straight_flush_with_ace_high() {
    let hand = [
        c(10, Suit::Spades),
        c(11, Suit::Spades),
        c(12, Suit::Spades),
        c(13, Suit::Spades),
        c(ACE, Suit::Spades),
    ];
    let eval = evaluate(&hand).unwrap();
    assert_eq!(eval.ranking, HandRanking::StraightFlush);
    assert_eq!(eval.high_card.rank, ACE);
    assert_eq!(eval.description, "Royal Flush");
}

#[test]
fn seven_cards_picks_the_best_five() {
    // Board: 2c 3c 4c 5c 9h, hole: Ac 6c -> should find the 6-high straight
    // flush in clubs (2,3,4,5,6), not merely a flush.
    let cards = [
        c(2, Suit::Clubs),
        c(3, Suit::Clubs),
        c(4, Suit::Clubs),
        c(5, Suit::Clubs),
        c(9, Suit::Hearts),
        c(ACE, Suit::Clubs),
        c(6, Suit::Clubs),
    ];
    let eval = evaluate(&cards).unwrap();
    assert_eq!(eval.ranking, HandRanking::StraightFlush);
    assert_eq!(eval.high_card.rank, 6);
}

#[test]
fn full_house_beats_flush() {
    let full_house = [
        c(9, Suit::Clubs),
        c(9, Suit::Diamonds),
        c(9, Suit::Hearts),
        c(4, Suit::Spades),
        c(4, Suit::Clubs),
    ];
    let flush = [
        c(2, Suit::Hearts),
        c(5, Suit::Hearts),
        c(7, Suit::Hearts),
        c(10, Suit::Hearts),
        c(ACE, Suit::Hearts),
    ];
    let fh_eval = evaluate(&full_house).unwrap();
    let fl_eval = evaluate(&flush).unwrap();
    assert_eq!(compare(&fh_eval, &fl_eval), Ordering::Greater);
}

#[test]
fn missing_kicker_compares_lower_than_present() {
    let four_kind = HandEvaluation {
        ranking: HandRanking::FourOfAKind,
        five_cards: [
            c(9, Suit::Clubs),
            c(9, Suit::Diamonds),
            c(9, Suit::Hearts),
            c(9, Suit::Spades),
            c(2, Suit::Clubs),
        ],
        high_card: c(9, Suit::Clubs),
        kickers: vec![],
        description: "Four of a Kind".into(),
    };
    let with_kicker = HandEvaluation {
        kickers: vec![c(2, Suit::Clubs)],
        ..four_kind.clone()
    };
    assert_eq!(compare(&with_kicker, &four_kind), Ordering::Greater);
}

#[test]
fn compare_is_a_total_order() {
    let hands: Vec<HandEvaluation> = vec![
        evaluate(&[
            c(2, Suit::Clubs),
            c(4, Suit::Hearts),
            c(7, Suit::Diamonds),
            c(9, Suit::Spades),
            c(ACE, Suit::Clubs),
        ])
        .unwrap(),
        evaluate(&[
            c(2, Suit::Clubs),
            c(2, Suit::Hearts),
            c(7, Suit::Diamonds),
            c(9, Suit::Spades),
            c(ACE, Suit::Clubs),
        ])
        .unwrap(),
        evaluate(&[
            c(10, Suit::Spades),
            c(11, Suit::Spades),
            c(12, Suit::Spades),
            c(13, Suit::Spades),
            c(ACE, Suit::Spades),
        ])
        .unwrap(),
    ];

    for a in &hands {
        for b in &hands {
            assert_eq!(compare(a, b), compare(b, a).reverse());
        }
    }

    // Transitivity across the three distinct-strength hands above.
    assert_eq!(compare(&hands[0], &hands[1]), Ordering::Less);
    assert_eq!(compare(&hands[1], &hands[2]), Ordering::Less);
    assert_eq!(compare(&hands[0], &hands[2]), Ordering::Less);
}
