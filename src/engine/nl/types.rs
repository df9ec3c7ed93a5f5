use serde::{Deserialize, Serialize};

pub type Chips = u64;
pub type SeatId = u8; // 0..=9, bounded by TableConfig::max_seats
pub type PlayerId = u64;

/// One of the four betting streets a hand visits after the deal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
}

/// Derived from the boolean flags on `PlayerState`; kept as an enum so
/// match arms over it stay exhaustive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Can act this round.
    Active,
    /// Out of the hand; cannot win any pot.
    Folded,
    /// Cannot act; still eligible to win pots it contributed to.
    AllIn,
    /// `chips == 0` and not all-in: sitting out, not dealt in.
    SittingOut,
}

/// `{id, seat, chips≥0, current_bet_this_round≥0, total_bet_this_hand≥0,
/// folded, all_in, last_action?}`, the player-at-table view the betting
/// engine operates on. Hole cards are owned by the table engine, not the
/// betting engine, since legality
/// and pot math never need to see them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub seat: SeatId,

    pub chips: Chips,
    pub current_bet_this_round: Chips,
    pub total_bet_this_hand: Chips,

    pub folded: bool,
    pub all_in: bool,
    pub has_acted_this_round: bool,
}

impl PlayerState {
    pub fn new(id: PlayerId, seat: SeatId, chips: Chips) -> Self {
        Self {
            id,
            seat,
            chips,
            current_bet_this_round: 0,
            total_bet_this_hand: 0,
            folded: false,
            all_in: false,
            has_acted_this_round: false,
        }
    }

    /// `folded ⇒ not acting`; `all_in ⇒ chips==0`; `chips==0 ∧ !all_in` is
    /// sitting out.
    pub fn status(&self) -> PlayerStatus {
        if self.folded {
            PlayerStatus::Folded
        } else if self.all_in {
            debug_assert_eq!(self.chips, 0, "all_in player must have chips==0");
            PlayerStatus::AllIn
        } else if self.chips == 0 {
            PlayerStatus::SittingOut
        } else {
            PlayerStatus::Active
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status(), PlayerStatus::Active)
    }

    pub fn is_still_in_hand(&self) -> bool {
        !self.folded
    }
}

/// `{amount, eligible}` — eligible is the set of non-folded contributors
/// at the pot's contribution tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    pub amount: Chips,
    pub eligible: Vec<SeatId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pots {
    pub main: Pot,
    pub sides: Vec<Pot>,
}

impl Default for Pot {
    fn default() -> Self {
        Self {
            amount: 0,
            eligible: Vec::new(),
        }
    }
}

impl Pots {
    pub fn total(&self) -> Chips {
        self.main.amount + self.sides.iter().map(|p| p.amount).sum::<Chips>()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStakes {
    pub small_blind: Chips,
    pub big_blind: Chips,
}

/// Immutable-for-the-hand configuration handed to the betting engine when a
/// hand is dealt (derived from `TableConfig` plus that hand's button/blind
/// seats).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandConfig {
    pub stakes: TableStakes,
    pub dealer_seat: SeatId,
    pub sb_seat: SeatId,
    pub bb_seat: SeatId,
    /// Seats wrap modulo this value (`TableConfig::max_seats`).
    pub max_seats: SeatId,
}
