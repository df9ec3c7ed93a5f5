use super::types::Chips;
use serde::{Deserialize, Serialize};

/// Just the kind, with no amount — used for `available_actions`, the
/// validation cache key, and `PlayerActionRecord::kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
}

/// `{kind, amount?}` dispatched to the betting engine.
/// For `Bet`/`Raise`, `to` is the new total to match this street, not a
/// delta on top of the previous bet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet { to: Chips },
    Raise { to: Chips },
    AllIn,
}

impl PlayerAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PlayerAction::Fold => ActionKind::Fold,
            PlayerAction::Check => ActionKind::Check,
            PlayerAction::Call => ActionKind::Call,
            PlayerAction::Bet { .. } => ActionKind::Bet,
            PlayerAction::Raise { .. } => ActionKind::Raise,
            PlayerAction::AllIn => ActionKind::AllIn,
        }
    }

    pub fn amount(&self) -> Option<Chips> {
        match self {
            PlayerAction::Bet { to } | PlayerAction::Raise { to } => Some(*to),
            _ => None,
        }
    }
}
