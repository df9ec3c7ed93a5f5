use super::state::BettingState;
use super::types::{Chips, SeatId};
use std::ops::RangeInclusive;

/// No-limit legality math: price to call, bet/raise bounds, and
/// whether a raise is "full" (meets the current minimum raise size, and so
/// reopens action for everyone, vs. a short all-in raise that only
/// obliges others to call).
pub trait BettingRules {
    fn price_to_call(&self, seat: SeatId) -> Chips;
    fn bet_to_bounds(&self, seat: SeatId) -> Option<RangeInclusive<Chips>>;
    fn raise_to_bounds(&self, seat: SeatId) -> Option<RangeInclusive<Chips>>;
    fn is_full_raise(&self, raise_amount: Chips) -> bool;
}

impl BettingRules for BettingState {
    fn price_to_call(&self, seat: SeatId) -> Chips {
        let Some(p) = self.player(seat) else { return 0 };
        if !p.is_active() {
            return 0;
        }
        self.current_bet.saturating_sub(p.current_bet_this_round)
    }

    /// BET is legal only while no one has opened betting this street
    /// (`current_bet == 0`); preflop this is never true because the blinds
    /// already set `current_bet` to the big blind, so the only opening
    /// action preflop is a raise over the blind — no special-casing needed.
    fn bet_to_bounds(&self, seat: SeatId) -> Option<RangeInclusive<Chips>> {
        if self.current_bet != 0 {
            return None;
        }
        let p = self.player(seat)?;
        if !p.is_active() {
            return None;
        }
        let min = self.cfg.stakes.big_blind.min(p.chips);
        let max = p.chips;
        if max == 0 {
            return None;
        }
        Some(min..=max)
    }

    fn raise_to_bounds(&self, seat: SeatId) -> Option<RangeInclusive<Chips>> {
        if self.current_bet == 0 {
            return None;
        }
        let p = self.player(seat)?;
        if !p.is_active() {
            return None;
        }
        let max = p.current_bet_this_round + p.chips;
        if max <= self.current_bet {
            return None;
        }
        // A player who already acted this round may only raise again if a
        // full raise has reopened betting since their last action.
        if p.has_acted_this_round {
            let acted_at = self.acted_epoch.get(&seat).copied().unwrap_or(0);
            if acted_at >= self.raise_epoch {
                return None;
            }
        }
        let min = (self.current_bet.saturating_add(self.min_raise)).min(max);
        Some(min..=max)
    }

    fn is_full_raise(&self, raise_amount: Chips) -> bool {
        raise_amount >= self.min_raise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::nl::types::{HandConfig, PlayerState as PS, Pots, TableStakes};
    use crate::engine::nl::Street;
    use std::collections::BTreeMap;

    fn state_with(players: Vec<PS>, current_bet: Chips, min_raise: Chips) -> BettingState {
        let cfg = HandConfig {
            stakes: TableStakes { small_blind: 1, big_blind: 2 },
            dealer_seat: 0,
            sb_seat: 1,
            bb_seat: 2,
            max_seats: 6,
        };
        BettingState {
            street: Street::Preflop,
            to_act: players.first().map(|p| p.seat).unwrap_or(0),
            current_bet,
            min_raise,
            last_aggressor: None,
            players,
            pots: Pots::default(),
            cfg,
            pending_to_match: Vec::new(),
            betting_locked_all_in: false,
            raise_epoch: 0,
            acted_epoch: BTreeMap::new(),
        }
    }

    #[test]
    fn price_to_call_is_the_gap_to_current_bet() {
        let mut p = PS::new(1, 0, 100);
        p.current_bet_this_round = 20;
        let state = state_with(vec![p], 50, 2);
        assert_eq!(state.price_to_call(0), 30);
    }

    #[test]
    fn bet_is_illegal_once_a_bet_is_open() {
        let p = PS::new(1, 0, 100);
        let state = state_with(vec![p], 50, 2);
        assert!(state.bet_to_bounds(0).is_none());
    }

    #[test]
    fn raise_minimum_is_current_bet_plus_min_raise() {
        let mut p = PS::new(1, 0, 1000);
        p.current_bet_this_round = 0;
        let state = state_with(vec![p], 50, 50);
        let bounds = state.raise_to_bounds(0).unwrap();
        assert_eq!(*bounds.start(), 100);
    }

    #[test]
    fn short_all_in_raise_does_not_reopen_for_players_who_already_acted() {
        let mut aggressor = PS::new(1, 0, 1000);
        aggressor.current_bet_this_round = 100;
        let mut acted = PS::new(2, 1, 1000);
        acted.current_bet_this_round = 100;
        acted.has_acted_this_round = true;
        let mut state = state_with(vec![aggressor, acted], 100, 20);
        state.acted_epoch.insert(1, 0);
        state.raise_epoch = 0;
        assert!(state.raise_to_bounds(1).is_none());
    }
}
