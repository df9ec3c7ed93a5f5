use super::state::BettingState;
use super::types::*;

/// Turn-order helpers. Seats wrap modulo
/// `cfg.max_seats`; folded and all-in players are skipped when advancing.
pub trait Seating {
    fn next_actor(&self, from: SeatId) -> SeatId;
    fn compute_first_to_act(&self, street: Street) -> SeatId;
}

impl Seating for BettingState {
    fn next_actor(&self, from: SeatId) -> SeatId {
        let max_seats = self.cfg.max_seats.max(1);
        let mut seat = from;
        for _ in 0..max_seats {
            seat = (seat + 1) % max_seats;
            if let Some(p) = self.players.iter().find(|p| p.seat == seat) {
                if p.is_active() {
                    return seat;
                }
            }
        }
        from
    }

    fn compute_first_to_act(&self, street: Street) -> SeatId {
        match street {
            // Pre-flop: seat after big blind.
            Street::Preflop => self.next_actor(self.cfg.bb_seat),
            // Post-flop: first non-folded, non-all-in seat left of dealer.
            _ => self.next_actor(self.cfg.dealer_seat),
        }
    }
}

/// Seats still in the hand, in order starting left of the dealer — used for
/// the odd-chip-remainder tie-break at showdown.
pub fn seats_left_of_dealer(players: &[PlayerState], dealer_seat: SeatId, max_seats: SeatId) -> Vec<SeatId> {
    let max_seats = max_seats.max(1);
    let mut order = Vec::new();
    let mut seat = dealer_seat;
    for _ in 0..max_seats {
        seat = (seat + 1) % max_seats;
        if players.iter().any(|p| p.seat == seat) {
            order.push(seat);
        }
    }
    order
}
