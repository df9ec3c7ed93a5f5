use super::errors::{InvariantCheck, StateError};
use super::events::GameEvent;
use super::seating::Seating;
use super::types::{Chips, HandConfig, PlayerState, Pots, SeatId, Street};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The betting engine's working state for one hand, one street at a time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BettingState {
    pub street: Street,
    pub to_act: SeatId,

    /// Highest `current_bet_this_round` among players still in the hand.
    pub current_bet: Chips,
    /// NL minimum-raise size for this round: the amount
    /// the next raise must add on top of `current_bet` to be a full raise.
    pub min_raise: Chips,
    pub last_aggressor: Option<SeatId>,

    pub players: Vec<PlayerState>,
    pub pots: Pots,

    pub cfg: HandConfig,

    /// Active seats that still owe chips to match `current_bet` or have not
    /// yet acted this round.
    pub pending_to_match: Vec<SeatId>,
    pub betting_locked_all_in: bool,

    /// Bumped on every full bet/raise; used to decide whether a player who
    /// already acted this round may raise again after a short all-in raise
    /// reopened only the call, not the raise, for everyone else.
    pub raise_epoch: u32,
    /// `seat -> raise_epoch` as of that seat's last action this round.
    pub acted_epoch: BTreeMap<SeatId, u32>,
}

impl BettingState {
    pub fn player(&self, seat: SeatId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.seat == seat)
    }

    pub fn player_mut(&mut self, seat: SeatId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.seat == seat)
    }

    pub fn active_seats(&self) -> Vec<SeatId> {
        self.players.iter().filter(|p| p.is_active()).map(|p| p.seat).collect()
    }

    /// Non-folded seats, i.e. still eligible to win a pot.
    pub fn seats_still_in_hand(&self) -> Vec<SeatId> {
        self.players.iter().filter(|p| p.is_still_in_hand()).map(|p| p.seat).collect()
    }

    pub fn may_continue_betting(&self) -> bool {
        self.seats_still_in_hand().len() > 1 && self.players.iter().filter(|p| p.is_active()).count() > 1
    }

    /// A street ends once every seat still in the hand has either
    /// folded, gone all-in, or matched `current_bet` and acted at least
    /// once this round.
    pub fn round_is_complete(&self) -> bool {
        self.pending_to_match.is_empty()
    }

    pub fn mark_acted(&mut self, seat: SeatId) {
        if let Some(p) = self.player_mut(seat) {
            p.has_acted_this_round = true;
        }
        self.acted_epoch.insert(seat, self.raise_epoch);
        self.pending_to_match.retain(|s| *s != seat);
    }

    /// A full bet/raise reopens action for every other seat still able to
    /// act; a short all-in raise only obliges them to call.
    pub fn reopen_for_full_raise(&mut self, aggressor: SeatId) {
        self.raise_epoch += 1;
        self.last_aggressor = Some(aggressor);
        self.pending_to_match = self
            .players
            .iter()
            .filter(|p| p.is_active() && p.seat != aggressor)
            .map(|p| p.seat)
            .collect();
    }

    /// A short all-in raise still obliges active players who have matched
    /// `current_bet` already to put in the difference, without granting
    /// them the right to raise again.
    pub fn reopen_call_only(&mut self, aggressor: SeatId) {
        self.last_aggressor = Some(aggressor);
        let owed: Vec<SeatId> = self
            .players
            .iter()
            .filter(|p| p.is_active() && p.seat != aggressor && p.current_bet_this_round < self.current_bet)
            .map(|p| p.seat)
            .collect();
        for seat in owed {
            if !self.pending_to_match.contains(&seat) {
                self.pending_to_match.push(seat);
            }
        }
    }

    pub fn recompute_lock_if_all_in(&mut self) -> Option<GameEvent> {
        let contestable = self.players.iter().filter(|p| p.is_still_in_hand()).count();
        let can_still_act = self.players.iter().any(|p| p.is_active());
        if contestable > 1 && !can_still_act {
            self.betting_locked_all_in = true;
            Some(GameEvent::AllPlayersAllIn)
        } else {
            None
        }
    }

    pub fn refresh_pots(&mut self) {
        self.pots = super::pots::compute_pots(&self.players);
    }

    /// Rolls committed chips from `current_bet_this_round` into
    /// `total_bet_this_hand`, resets round-scoped accounting, and sets
    /// `to_act` for the new street.
    pub fn reset_per_street(&mut self, street: Street) {
        for p in &mut self.players {
            p.total_bet_this_hand = p.total_bet_this_hand.saturating_add(p.current_bet_this_round);
            p.current_bet_this_round = 0;
            if p.is_active() {
                p.has_acted_this_round = false;
            }
        }
        self.street = street;
        self.current_bet = 0;
        self.min_raise = self.cfg.stakes.big_blind;
        self.last_aggressor = None;
        self.acted_epoch.clear();

        self.to_act = self.compute_first_to_act(street);
        self.pending_to_match = self.active_seats();

        self.refresh_pots();
    }
}

impl InvariantCheck for BettingState {
    fn validate_invariants(&self) -> Result<(), StateError> {
        let folded: std::collections::HashSet<_> =
            self.players.iter().filter(|p| p.folded).map(|p| p.seat).collect();
        for sid in self.pots.main.eligible.iter().chain(self.pots.sides.iter().flat_map(|p| p.eligible.iter())) {
            if folded.contains(sid) {
                return Err(StateError::InvariantViolation("folded seat present in pot eligibility"));
            }
        }
        for p in &self.players {
            if p.all_in && p.chips != 0 {
                return Err(StateError::InvariantViolation("all-in player retains chips"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::nl::types::{Pot, TableStakes};
    use crate::test_support::assert_round_trip_json;

    fn sample_state() -> BettingState {
        let stakes = TableStakes { small_blind: 1, big_blind: 2 };
        let cfg = HandConfig {
            stakes,
            dealer_seat: 0,
            sb_seat: 1,
            bb_seat: 2,
            max_seats: 6,
        };
        let mut p0 = PlayerState::new(1, 0, 900);
        p0.current_bet_this_round = 50;
        p0.total_bet_this_hand = 100;
        p0.has_acted_this_round = true;
        let mut p1 = PlayerState::new(2, 1, 0);
        p1.current_bet_this_round = 40;
        p1.total_bet_this_hand = 90;
        p1.all_in = true;
        p1.has_acted_this_round = true;

        BettingState {
            street: Street::Turn,
            to_act: 0,
            current_bet: 90,
            min_raise: 40,
            last_aggressor: Some(0),
            players: vec![p0, p1],
            pots: Pots {
                main: Pot { amount: 180, eligible: vec![0, 1] },
                sides: vec![Pot { amount: 10, eligible: vec![0] }],
            },
            cfg,
            pending_to_match: vec![0],
            betting_locked_all_in: false,
            raise_epoch: 1,
            acted_epoch: BTreeMap::new(),
        }
    }

    #[test]
    fn betting_state_round_trips_with_serde() {
        assert_round_trip_json(&sample_state());
    }

    #[test]
    fn round_is_complete_reflects_pending_to_match() {
        let mut state = sample_state();
        assert!(!state.round_is_complete());
        state.pending_to_match.clear();
        assert!(state.round_is_complete());
    }
}
