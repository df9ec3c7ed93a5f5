//! Showdown settlement: for each pot independently,
//! evaluate the best 5-card hand among eligible non-folded players and
//! split `floor(amount / winners)`, with the odd-chip remainder going to
//! the first winner left of the dealer.

use crate::cards::Card;
use crate::engine::nl::types::{Chips, Pot, SeatId};
use crate::engine::nl::seats_left_of_dealer;
use crate::handeval::{compare, evaluate, HandEvaluation, HandRanking};

use super::types::TableState;

#[derive(Clone, Debug, PartialEq)]
pub struct PotSettlement {
    pub pot_index: usize,
    pub amount: Chips,
    pub winners: Vec<SeatId>,
    pub per_winner: Chips,
    pub odd_chip_seat: Option<SeatId>,
    pub ranking: Option<HandRanking>,
}

fn best_hand(board: &[Card], hole: &[Card; 2]) -> Option<HandEvaluation> {
    let mut cards = Vec::with_capacity(board.len() + 2);
    cards.extend_from_slice(board);
    cards.extend_from_slice(hole);
    evaluate(&cards).ok()
}

/// Settles one pot: evaluates every eligible seat's best hand and splits
/// the pot among the winning set.
fn settle_pot(state: &TableState, index: usize, pot: &Pot) -> PotSettlement {
    let mut best: Option<HandEvaluation> = None;
    let mut winners: Vec<SeatId> = Vec::new();

    for &seat in &pot.eligible {
        let Some(seated) = state.seats.get(&seat) else { continue };
        let Some(hole) = seated.hole_cards else { continue };
        let Some(eval) = best_hand(&state.board, &hole) else { continue };

        match &best {
            None => {
                best = Some(eval);
                winners = vec![seat];
            }
            Some(current_best) => match compare(&eval, current_best) {
                std::cmp::Ordering::Greater => {
                    best = Some(eval);
                    winners = vec![seat];
                }
                std::cmp::Ordering::Equal => winners.push(seat),
                std::cmp::Ordering::Less => {}
            },
        }
    }

    let winner_count = winners.len().max(1) as Chips;
    let per_winner = pot.amount / winner_count;
    let remainder = pot.amount % winner_count;

    let odd_chip_seat = if remainder > 0 {
        let order = seats_left_of_dealer(
            &state.betting.as_ref().map(|b| b.players.clone()).unwrap_or_default(),
            state.dealer_seat,
            state.config.max_seats,
        );
        order.into_iter().find(|seat| winners.contains(seat))
    } else {
        None
    };

    PotSettlement {
        pot_index: index,
        amount: pot.amount,
        winners,
        per_winner,
        odd_chip_seat,
        ranking: best.map(|e| e.ranking),
    }
}

/// Settles every pot (main then sides) independently.
pub fn settle_showdown(state: &TableState) -> Vec<PotSettlement> {
    let Some(betting) = &state.betting else { return Vec::new() };
    let mut settlements = Vec::with_capacity(1 + betting.pots.sides.len());
    settlements.push(settle_pot(state, 0, &betting.pots.main));
    for (i, side) in betting.pots.sides.iter().enumerate() {
        settlements.push(settle_pot(state, i + 1, side));
    }
    settlements
}

/// Applies settlements to seated players' chip stacks, crediting the odd
/// chip to the designated seat.
pub fn apply_settlements(state: &mut TableState, settlements: &[PotSettlement]) {
    for settlement in settlements {
        for &seat in &settlement.winners {
            let mut amount = settlement.per_winner;
            if Some(seat) == settlement.odd_chip_seat {
                amount += settlement.amount % settlement.winners.len().max(1) as Chips;
            }
            if let Some(player) = state.seats.get_mut(&seat) {
                player.chips += amount;
            }
        }
    }
}
