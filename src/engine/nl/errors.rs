use super::rules::BettingRules;
use super::state::BettingState;
use super::types::{Chips, SeatId};
use thiserror::Error;

/// Hints attached to an illegal-action error: min/max bet and the call
/// amount the actor actually faced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionHints {
    pub call_amount: Option<Chips>,
    pub min_bet: Option<Chips>,
    pub max_bet: Option<Chips>,
}

/// Computes the `hints` object a client needs to retry a rejected action:
/// the price to call plus whichever of bet/raise ranges currently apply.
pub fn hints_for(state: &BettingState, seat: SeatId) -> ActionHints {
    let range = state.bet_to_bounds(seat).or_else(|| state.raise_to_bounds(seat));
    ActionHints {
        call_amount: Some(state.price_to_call(seat)),
        min_bet: range.as_ref().map(|r| *r.start()),
        max_bet: range.map(|r| *r.end()),
    }
}

/// Betting-engine failures.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    #[error("it is not this player's turn to act")]
    NotYourTurn,
    #[error("this player cannot act (folded, all-in, or sitting out)")]
    ActorCannotAct,
    #[error("action is not legal in the current betting state")]
    IllegalAction,
    #[error("cannot check while facing an outstanding bet")]
    CannotCheckFacingBet,
    #[error("cannot bet: the pot is already opened, raise instead")]
    CannotBetWhenOpened,
    #[error("call amount does not match the price to call")]
    BadCallAmount,
    #[error("raise is below the minimum legal raise size")]
    RaiseBelowMinimum,
    #[error("player does not have enough chips for this action")]
    InsufficientChips,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("illegal state transition")]
    InvalidTransition,
    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub trait InvariantCheck {
    fn validate_invariants(&self) -> Result<(), StateError>;
}
