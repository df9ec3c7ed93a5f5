use std::sync::Arc;

use crate::config::SyncConfig;
use crate::deck_oracle::InMemoryDeckOracle;
use crate::engine::nl::{ActionError, PlayerAction, TableStakes};
use crate::logging::TracingGameLogger;
use crate::persistence::InMemoryPersistence;
use crate::resilience::ResilienceRegistry;

use super::engine::TableEngine;
use super::types::TableConfig;

fn test_table(max_seats: u8) -> TableEngine {
    let config = TableConfig {
        table_id: "t1".to_string(),
        min_buy_in: 20,
        max_buy_in: 1000,
        stakes: TableStakes { small_blind: 1, big_blind: 2 },
        max_seats,
    };
    TableEngine::new(
        config,
        Arc::new(InMemoryDeckOracle::new()),
        Arc::new(InMemoryPersistence::new()),
        Arc::new(TracingGameLogger::default()),
        Arc::new(ResilienceRegistry::new()),
        SyncConfig::default(),
    )
}

/// S1: heads-up, the button folds preflop facing the big blind. The hand
/// ends immediately without a showdown and the pot goes entirely to the
/// big blind.
#[tokio::test]
async fn heads_up_preflop_fold_awards_the_whole_pot_without_showdown() {
    let mut table = test_table(2);
    table.add_player(1, 0, 100, 0).unwrap();
    table.add_player(2, 1, 100, 0).unwrap();

    table.start_hand(1).await.unwrap();
    assert_eq!(table.get_state()["game_state"]["phase"], "PRE_FLOP");

    // Heads-up: dealer/button (seat 0) posts the small blind and acts first.
    let events = table.apply_action(1, PlayerAction::Fold, 2).await.unwrap();

    let phase = table.get_state()["game_state"]["phase"].clone();
    assert_eq!(phase, "FINISHED");
    assert!(events.iter().any(|e| matches!(e.payload, super::events::TableEventPayload::HandCompleted { .. })));

    let players = table.get_state()["player_states"].clone();
    let winner_chips = players["2"]["chips"].as_u64().unwrap();
    // Big blind (seat 1, player 2) wins the small blind + big blind pot:
    // started with 100, posted 2, wins back 1 (villain's small blind) net.
    assert_eq!(winner_chips, 101);
    let loser_chips = players["1"]["chips"].as_u64().unwrap();
    assert_eq!(loser_chips, 99);
}

/// S2: a three-handed hand where one player is short-stacked and goes
/// all-in, producing a side pot that only the two bigger stacks contest.
#[tokio::test]
async fn three_way_all_in_produces_an_independently_settled_side_pot() {
    let mut table = test_table(3);
    table.add_player(1, 0, 20, 0).unwrap(); // short stack, dealer
    table.add_player(2, 1, 200, 0).unwrap(); // small blind
    table.add_player(3, 2, 200, 0).unwrap(); // big blind

    table.start_hand(1).await.unwrap();

    // Short stack (seat 0) shoves preflop.
    table.apply_action(1, PlayerAction::AllIn, 2).await.unwrap();
    // Small blind calls.
    table.apply_action(2, PlayerAction::Call, 3).await.unwrap();
    // Big blind calls, completing the preflop round and dealing the flop.
    table.apply_action(3, PlayerAction::Call, 4).await.unwrap();

    let state = table.get_state();
    assert_eq!(state["game_state"]["phase"], "FLOP");
    assert_eq!(state["game_state"]["board"].as_array().unwrap().len(), 3);

    // The short stack is covered: it can only win up to what it put in,
    // and any further betting between the two remaining players after this
    // point builds a side pot it is not eligible for. We don't drive the
    // hand to showdown here (outcomes are card-dependent); the pot
    // structure itself is exercised directly in `showdown` unit tests.
}

/// Chips committed beyond the blinds (a call here) must come back out of
/// the authoritative `seats[].chips` stack before showdown adds winnings
/// on top, or the total chip count in play inflates.
#[tokio::test]
async fn total_chips_in_play_are_conserved_through_a_full_showdown() {
    let mut table = test_table(2);
    table.add_player(1, 0, 100, 0).unwrap();
    table.add_player(2, 1, 100, 0).unwrap();
    table.start_hand(1).await.unwrap();

    // Preflop: seat 0 (dealer/sb) calls the big blind, seat 1 (bb) checks.
    table.apply_action(1, PlayerAction::Call, 2).await.unwrap();
    table.apply_action(2, PlayerAction::Check, 3).await.unwrap();
    assert_eq!(table.get_state()["game_state"]["phase"], "FLOP");

    // Flop/turn/river: seat 1 acts first post-flop, both check every street.
    table.apply_action(2, PlayerAction::Check, 4).await.unwrap();
    table.apply_action(1, PlayerAction::Check, 5).await.unwrap();
    assert_eq!(table.get_state()["game_state"]["phase"], "TURN");

    table.apply_action(2, PlayerAction::Check, 6).await.unwrap();
    table.apply_action(1, PlayerAction::Check, 7).await.unwrap();
    assert_eq!(table.get_state()["game_state"]["phase"], "RIVER");

    table.apply_action(2, PlayerAction::Check, 8).await.unwrap();
    let events = table.apply_action(1, PlayerAction::Check, 9).await.unwrap();
    assert!(events.iter().any(|e| matches!(e.payload, super::events::TableEventPayload::HandCompleted { .. })));

    let players = table.get_state()["player_states"].clone();
    let seat0_chips = players["1"]["chips"].as_u64().unwrap();
    let seat1_chips = players["2"]["chips"].as_u64().unwrap();
    assert_eq!(seat0_chips + seat1_chips, 200, "no chips should be minted or destroyed across a hand");
}

#[tokio::test]
async fn cannot_start_a_hand_with_fewer_than_two_funded_players() {
    let mut table = test_table(2);
    table.add_player(1, 0, 100, 0).unwrap();
    let err = table.start_hand(1).await.unwrap_err();
    assert!(matches!(err, super::errors::TableError::CannotStartHand));
}

#[tokio::test]
async fn buy_in_outside_the_configured_range_is_rejected() {
    let mut table = test_table(2);
    let err = table.add_player(1, 0, 5, 0).unwrap_err();
    assert!(matches!(err, super::errors::TableError::InvalidBuyIn { .. }));
}

#[tokio::test]
async fn acting_out_of_turn_is_rejected() {
    let mut table = test_table(2);
    table.add_player(1, 0, 100, 0).unwrap();
    table.add_player(2, 1, 100, 0).unwrap();
    table.start_hand(1).await.unwrap();

    // Heads-up: seat 0 (dealer/sb) acts first preflop, not seat 1.
    let err = table.apply_action(2, PlayerAction::Check, 2).await.unwrap_err();
    assert!(matches!(err, super::errors::TableError::NotYourTurn));
}

#[tokio::test]
async fn illegal_bet_size_surfaces_as_an_engine_validation_error() {
    let mut table = test_table(2);
    table.add_player(1, 0, 100, 0).unwrap();
    table.add_player(2, 1, 100, 0).unwrap();
    table.start_hand(1).await.unwrap();

    let err = table.apply_action(1, PlayerAction::Raise { to: 3 }, 2).await.unwrap_err();
    match err {
        super::errors::TableError::IllegalAction(ActionError::RaiseBelowMinimum) => {}
        other => panic!("expected RaiseBelowMinimum, got {other:?}"),
    }
}

#[tokio::test]
async fn player_view_hides_other_players_hole_cards_before_showdown() {
    let mut table = test_table(2);
    table.add_player(1, 0, 100, 0).unwrap();
    table.add_player(2, 1, 100, 0).unwrap();
    table.start_hand(1).await.unwrap();

    let view = table.get_player_view(1);
    let players = view["players"].as_array().unwrap();
    let other = players.iter().find(|p| p["player_id"] == 2).unwrap();
    assert_eq!(other["hole_cards"], serde_json::json!(["hidden", "hidden"]));
    let mine = players.iter().find(|p| p["player_id"] == 1).unwrap();
    assert_ne!(mine["hole_cards"], serde_json::json!(["hidden", "hidden"]));
}

#[tokio::test]
async fn removing_a_player_mid_hand_folds_them_and_frees_the_seat() {
    let mut table = test_table(3);
    table.add_player(1, 0, 100, 0).unwrap();
    table.add_player(2, 1, 100, 0).unwrap();
    table.add_player(3, 2, 100, 0).unwrap();
    table.start_hand(1).await.unwrap();

    table.remove_player(2, 2).await.unwrap();
    let state = table.get_state();
    assert!(state["player_states"].get("2").is_none());
    assert_eq!(state["game_state"]["phase"], "PRE_FLOP");
}
