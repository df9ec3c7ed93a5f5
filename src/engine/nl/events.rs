use super::types::{Chips, SeatId, Street};
use serde::{Deserialize, Serialize};

/// The action actually applied, normalized so callers don't have to
/// re-derive whether a call was short or a raise was full.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NormalizedAction {
    Fold,
    Check,
    Call { call_amount: Chips, full_call: bool },
    Bet { to: Chips },
    Raise { to: Chips, raise_amount: Chips, full_raise: bool },
    AllInAsCall { call_amount: Chips, full_call: bool },
    AllInAsBet { to: Chips },
    AllInAsRaise { to: Chips, raise_amount: Chips, full_raise: bool },
}

/// Betting-engine-internal events; the table engine maps these onto its
/// own externally visible event catalogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    ActionApplied { seat: SeatId, action: NormalizedAction },
    PotUpdated,
    StreetEnded { street: Street },
    AllPlayersAllIn,
    HandEndedByFolds { winner: SeatId, pots: super::types::Pots },
}
