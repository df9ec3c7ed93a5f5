//! Table-level state: seats, the board, the hand
//! counter, and whichever betting round is currently live. Grounded on
//! `engine::nl::types`, which this module wraps rather than duplicates —
//! a `TableState` owns a `BettingState` once a hand is dealt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::nl::types::{Chips, PlayerId, SeatId, TableStakes};
use crate::engine::nl::BettingState;

/// WAITING ⟶ PRE_FLOP ⟶ FLOP ⟶ TURN ⟶ RIVER ⟶ SHOWDOWN ⟶ FINISHED.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TablePhase {
    Waiting,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Finished,
}

/// `{min_buy_in, max_buy_in, stakes, max_seats}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub table_id: String,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub stakes: TableStakes,
    pub max_seats: SeatId,
}

/// A player occupying a seat between hands as well as during one. Hole
/// cards live here (not on `engine::nl::PlayerState`) because legality and
/// pot math never need to see them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatedPlayer {
    pub player_id: PlayerId,
    pub seat: SeatId,
    pub chips: Chips,
    pub hole_cards: Option<[Card; 2]>,
    pub sitting_out: bool,
}

impl SeatedPlayer {
    pub fn new(player_id: PlayerId, seat: SeatId, chips: Chips) -> Self {
        Self { player_id, seat, chips, hole_cards: None, sitting_out: false }
    }
}

/// The table's authoritative state. `betting` is `None` in
/// `WAITING`/`FINISHED` and `Some` for every phase of an active hand.
/// Not `Deserialize`: nothing reconstructs a `TableState` from the wire
/// directly — the synchronizer's `Snapshot` (a `serde_json::Value` tree,
/// see `sync::types`) is what crosses process boundaries.
#[derive(Clone, Debug, Serialize)]
pub struct TableState {
    pub config: TableConfig,
    pub phase: TablePhase,
    pub seats: BTreeMap<SeatId, SeatedPlayer>,
    pub dealer_seat: SeatId,
    pub board: Vec<Card>,
    pub hand_number: u64,
    #[serde(skip)]
    pub betting: Option<BettingState>,
}

impl TableState {
    pub fn new(config: TableConfig) -> Self {
        Self { config, phase: TablePhase::Waiting, seats: BTreeMap::new(), dealer_seat: 0, board: Vec::new(), hand_number: 0, betting: None }
    }

    pub fn seated_player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn occupied_seats(&self) -> Vec<SeatId> {
        self.seats.keys().copied().collect()
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<SeatId> {
        self.seats.iter().find(|(_, p)| p.player_id == player_id).map(|(seat, _)| *seat)
    }
}
