//! Converts `TableState` into the `serde_json::Value` trees the state
//! synchronizer diffs and hashes, and produces the player-facing
//! view that hides hole cards.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::engine::nl::types::{PlayerId, Street};

use super::types::{TablePhase, TableState};

fn street_name(street: Street) -> &'static str {
    match street {
        Street::Preflop => "PRE_FLOP",
        Street::Flop => "FLOP",
        Street::Turn => "TURN",
        Street::River => "RIVER",
    }
}

/// The authoritative `game_state` tree: table-wide fields only,
/// nothing per-player. Includes hole cards for no one — those live in
/// `player_states`.
pub fn game_state_json(state: &TableState) -> Value {
    let (pot, street, current_bet, to_act) = match &state.betting {
        Some(betting) => (
            Some(betting.pots.total()),
            Some(street_name(betting.street)),
            Some(betting.current_bet),
            Some(betting.to_act),
        ),
        None => (None, None, None, None),
    };

    json!({
        "table_id": state.config.table_id,
        "phase": serde_json::to_value(state.phase).unwrap_or_default(),
        "dealer_seat": state.dealer_seat,
        "hand_number": state.hand_number,
        "board": state.board.iter().map(|c| c.to_string()).collect::<Vec<_>>(),
        "pot": pot,
        "street": street,
        "current_bet": current_bet,
        "to_act_seat": to_act,
    })
}

/// Per-player fields, keyed by the player id rendered as a string.
/// Hole cards are included here always — this is the internal
/// authoritative view the synchronizer diffs; `player_view` below is
/// what's handed to a specific client.
pub fn player_states_json(state: &TableState) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (seat, seated) in &state.seats {
        let betting_player = state.betting.as_ref().and_then(|b| b.player(*seat));
        let entry = json!({
            "seat": seat,
            "chips": seated.chips,
            "sitting_out": seated.sitting_out,
            "hole_cards": seated.hole_cards.map(|cards| cards.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
            "current_bet_this_round": betting_player.map(|p| p.current_bet_this_round),
            "total_bet_this_hand": betting_player.map(|p| p.total_bet_this_hand),
            "folded": betting_player.map(|p| p.folded),
            "all_in": betting_player.map(|p| p.all_in),
        });
        out.insert(seated.player_id.to_string(), entry);
    }
    out
}

/// The view handed to `player_id`: other players'
/// hole cards are replaced with an opaque marker outside SHOWDOWN.
pub fn player_view(state: &TableState, player_id: PlayerId) -> Value {
    let reveal_all = matches!(state.phase, TablePhase::Showdown | TablePhase::Finished);
    let mut players = Vec::new();
    for (seat, seated) in &state.seats {
        let betting_player = state.betting.as_ref().and_then(|b| b.player(*seat));
        let hole_cards = if seated.player_id == player_id || reveal_all {
            seated.hole_cards.map(|cards| cards.iter().map(|c| c.to_string()).collect::<Vec<_>>())
        } else {
            seated.hole_cards.as_ref().map(|_| vec!["hidden".to_string(), "hidden".to_string()])
        };
        players.push(json!({
            "player_id": seated.player_id,
            "seat": seat,
            "chips": seated.chips,
            "hole_cards": hole_cards,
            "current_bet_this_round": betting_player.map(|p| p.current_bet_this_round),
            "folded": betting_player.map(|p| p.folded),
            "all_in": betting_player.map(|p| p.all_in),
        }));
    }

    json!({
        "game_state": game_state_json(state),
        "players": players,
    })
}
