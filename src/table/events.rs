//! The externally visible event catalogue. Every event is paired with the snapshot version/hash it
//! produced; `TableEngine` stamps that envelope on, the event variants
//! here only carry the payload.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::nl::types::{Chips, PlayerId, SeatId, Street};
use crate::handeval::HandRanking;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableEventPayload {
    PlayerJoined { player_id: PlayerId, seat: SeatId, buy_in: Chips },
    PlayerLeft { player_id: PlayerId },
    GameStarted { dealer_seat: SeatId },
    CardsDealt,
    BlindsPosted { sb_seat: SeatId, bb_seat: SeatId, small_blind: Chips, big_blind: Chips },
    ActionPerformed { player_id: PlayerId, kind: crate::engine::nl::ActionKind, amount: Option<Chips>, pot_contribution: Chips },
    CommunityCardsDealt { phase: Street, cards: Vec<Card> },
    NewBettingRound { street: Street },
    HandCompleted { winners: Vec<HandWinner> },
    GameEnded,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandWinner {
    pub player_id: PlayerId,
    pub pot_index: usize,
    pub amount: Chips,
    pub ranking: Option<HandRanking>,
}

/// `{event_kind, timestamp, table_id, hand_number, snapshot_version,
/// snapshot_hash, payload}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableEventEnvelope {
    pub timestamp: i64,
    pub table_id: String,
    pub hand_number: u64,
    pub snapshot_version: u64,
    pub snapshot_hash: String,
    #[serde(flatten)]
    pub payload: TableEventPayload,
}
