use super::rules::BettingRules;
use super::state::BettingState;
use super::types::{ActionKind, Chips, SeatId};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// `available_actions(player, context)` plus the amount ranges needed for
/// the `hints` object on a rejected action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegalActions {
    pub may_fold: bool,
    pub may_check: bool,
    pub call_amount: Option<Chips>,
    pub bet_to_range: Option<RangeInclusive<Chips>>,
    pub raise_to_range: Option<RangeInclusive<Chips>>,
}

impl LegalActions {
    pub fn none() -> Self {
        Self {
            may_fold: false,
            may_check: false,
            call_amount: None,
            bet_to_range: None,
            raise_to_range: None,
        }
    }

    /// `available_actions(p, ctx)` is a subset of the six
    /// kinds (trivially true by construction) — materialized as a set for
    /// `validate(...).ok ⇔ a.kind ∈ available_actions`.
    pub fn kinds(&self) -> BTreeSet<ActionKind> {
        let mut out = BTreeSet::new();
        if self.may_fold {
            out.insert(ActionKind::Fold);
        }
        if self.may_check {
            out.insert(ActionKind::Check);
        }
        if self.call_amount.is_some() && !self.may_check {
            out.insert(ActionKind::Call);
        }
        if self.bet_to_range.is_some() {
            out.insert(ActionKind::Bet);
        }
        if self.raise_to_range.is_some() {
            out.insert(ActionKind::Raise);
        }
        if self.call_amount.is_some() || self.bet_to_range.is_some() || self.raise_to_range.is_some() {
            out.insert(ActionKind::AllIn);
        }
        out
    }
}

/// `available_actions(player, context)`.
pub fn legal_actions_for(state: &BettingState, seat: SeatId) -> LegalActions {
    let Some(player) = state.players.iter().find(|p| p.seat == seat) else {
        return LegalActions::none();
    };
    if !player.is_active() || seat != state.to_act {
        return LegalActions::none();
    }

    let price = state.price_to_call(seat);
    LegalActions {
        may_fold: true,
        may_check: price == 0,
        call_amount: Some(price),
        bet_to_range: state.bet_to_bounds(seat),
        raise_to_range: state.raise_to_bounds(seat),
    }
}
