//! Table-engine failures.

use thiserror::Error;

use crate::engine::nl::ActionError;
use crate::engine::nl::types::{Chips, PlayerId, SeatId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("buy-in {amount} is outside [{min},{max}]")]
    InvalidBuyIn { amount: Chips, min: Chips, max: Chips },
    #[error("seat {0} is already occupied")]
    SeatTaken(SeatId),
    #[error("seat {seat} is outside the table's {max_seats} seats")]
    SeatOutOfRange { seat: SeatId, max_seats: SeatId },
    #[error("player {0} is not seated at this table")]
    UnknownPlayer(PlayerId),
    #[error("cannot start a hand unless the table is WAITING with at least two players holding chips")]
    CannotStartHand,
    #[error("it is not this player's turn to act")]
    NotYourTurn,
    #[error("betting engine rejected the action: {0}")]
    IllegalAction(#[from] ActionError),
    #[error("no hand is in progress")]
    NoHandInProgress,
    #[error("the deck oracle became unavailable mid-deal; the hand was canceled and contributed chips were refunded")]
    DeckUnavailable,
}
