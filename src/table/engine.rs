//! The per-table actor: owns `TableState` and a `StateSynchronizer`, drives the hand
//! state machine, and is the only thing that calls the deck oracle and
//! persistence collaborators. One struct owning state plus injected
//! collaborators, with `#[instrument]`ed entry points and a `LOG_TARGET`
//! const, called directly rather than driven through a channel — there's
//! no ingress/transport layer in front of it to warrant one.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::SyncConfig;
use crate::deck_oracle::{DeckHandle, DeckOracle};
use crate::engine::nl::types::{Chips, HandConfig, PlayerId, PlayerState, SeatId, Street, TableStakes};
use crate::engine::nl::{self as nl_engine, ActionKind, LegalActions, PlayerAction, Transition, ValidationCache};
use crate::logging::{GameLogger, LogLevel};
use crate::persistence::{HandStats, PersistenceClient};
use crate::resilience::{AbortSignal, ResilienceRegistry};
use crate::sync::{PlayerActionRecord, PlayerRole, StateSynchronizer};

use super::dealing;
use super::errors::TableError;
use super::events::{HandWinner, TableEventEnvelope, TableEventPayload};
use super::showdown;
use super::types::{SeatedPlayer, TableConfig, TablePhase, TableState};
use super::view;

const LOG_TARGET: &str = "poker_core::table";

fn street_to_phase(street: Street) -> TablePhase {
    match street {
        Street::Preflop => TablePhase::PreFlop,
        Street::Flop => TablePhase::Flop,
        Street::Turn => TablePhase::Turn,
        Street::River => TablePhase::River,
    }
}

fn community_card_count(street: Street) -> usize {
    match street {
        Street::Flop => 3,
        Street::Turn | Street::River => 1,
        Street::Preflop => 0,
    }
}

pub struct TableEngine {
    state: TableState,
    synchronizer: StateSynchronizer,
    deck_handle: Option<DeckHandle>,
    deck_oracle: Arc<dyn DeckOracle>,
    persistence: Arc<dyn PersistenceClient>,
    logger: Arc<dyn GameLogger>,
    registry: Arc<ResilienceRegistry>,
    validation_cache: ValidationCache,
    abort_signal: AbortSignal,
}

impl TableEngine {
    pub fn new(
        config: TableConfig,
        deck_oracle: Arc<dyn DeckOracle>,
        persistence: Arc<dyn PersistenceClient>,
        logger: Arc<dyn GameLogger>,
        registry: Arc<ResilienceRegistry>,
        sync_config: SyncConfig,
    ) -> Self {
        let state = TableState::new(config);
        let synchronizer = StateSynchronizer::new(view::game_state_json(&state), BTreeMap::new(), 0, sync_config);
        Self {
            state,
            synchronizer,
            deck_handle: None,
            deck_oracle,
            persistence,
            logger,
            registry,
            validation_cache: ValidationCache::default(),
            abort_signal: AbortSignal::new(),
        }
    }

    fn log_info(&self, message: &str, context: BTreeMap<String, Value>) {
        self.logger.log(LogLevel::Info, message, &context);
    }

    /// Mirrors every seated player's chip stack from the live betting
    /// state. Must run after every applied action (bets/calls/raises
    /// mutate `betting.players[].chips`, not `seats[].chips` directly) and
    /// before settlement adds winnings on top, or chips get minted: without
    /// this, `seated.chips` would still reflect the pre-street stack while
    /// the pot already holds what was bet out of it.
    fn reconcile_seated_chips(&mut self) {
        let Some(betting) = &self.state.betting else { return };
        for player in &betting.players {
            if let Some(seated) = self.state.seats.get_mut(&player.seat) {
                seated.chips = player.chips;
            }
        }
    }

    /// Re-derives `game_state`/`player_states` from `self.state` and pushes
    /// the resulting delta into the synchronizer.
    fn sync_snapshot(&mut self, timestamp: i64) {
        let game_state = view::game_state_json(&self.state);
        let player_states = view::player_states_json(&self.state);
        self.synchronizer.apply_update(game_state, player_states, timestamp);
    }

    fn envelope(&self, timestamp: i64, payload: TableEventPayload) -> TableEventEnvelope {
        let snapshot = self.synchronizer.current();
        TableEventEnvelope {
            timestamp,
            table_id: self.state.config.table_id.clone(),
            hand_number: self.state.hand_number,
            snapshot_version: snapshot.version,
            snapshot_hash: snapshot.hash.clone(),
            payload,
        }
    }

    pub fn get_state(&self) -> Value {
        serde_json::json!({
            "game_state": view::game_state_json(&self.state),
            "player_states": view::player_states_json(&self.state),
        })
    }

    pub fn get_player_view(&self, player_id: PlayerId) -> Value {
        view::player_view(&self.state, player_id)
    }

    pub fn get_available_actions(&self, player_id: PlayerId) -> LegalActions {
        let Some(seat) = self.state.seat_of(player_id) else {
            return LegalActions::none();
        };
        match &self.state.betting {
            Some(betting) => nl_engine::legal_actions(betting, seat),
            None => LegalActions::none(),
        }
    }

    /// `add_player(player_id, seat, buy_in)`.
    #[instrument(skip(self), target = LOG_TARGET)]
    pub fn add_player(&mut self, player_id: PlayerId, seat: SeatId, buy_in: Chips, timestamp: i64) -> Result<TableEventEnvelope, TableError> {
        let cfg = &self.state.config;
        if buy_in < cfg.min_buy_in || buy_in > cfg.max_buy_in {
            return Err(TableError::InvalidBuyIn { amount: buy_in, min: cfg.min_buy_in, max: cfg.max_buy_in });
        }
        if seat >= cfg.max_seats {
            return Err(TableError::SeatOutOfRange { seat, max_seats: cfg.max_seats });
        }
        if self.state.seats.contains_key(&seat) {
            return Err(TableError::SeatTaken(seat));
        }

        self.state.seats.insert(seat, SeatedPlayer::new(player_id, seat, buy_in));
        info!(target: LOG_TARGET, player_id, seat, buy_in, "player joined");
        self.sync_snapshot(timestamp);
        Ok(self.envelope(timestamp, TableEventPayload::PlayerJoined { player_id, seat, buy_in }))
    }

    /// `remove_player(player_id)`: if active mid-hand the player is
    /// marked folded before the seat is freed.
    #[instrument(skip(self), target = LOG_TARGET)]
    pub fn remove_player(&mut self, player_id: PlayerId, timestamp: i64) -> Result<TableEventEnvelope, TableError> {
        let seat = self.state.seat_of(player_id).ok_or(TableError::UnknownPlayer(player_id))?;

        if let Some(betting) = self.state.betting.as_mut() {
            if let Some(player) = betting.player_mut(seat) {
                player.folded = true;
            }
        }
        self.state.seats.remove(&seat);
        info!(target: LOG_TARGET, player_id, seat, "player left");
        self.sync_snapshot(timestamp);
        Ok(self.envelope(timestamp, TableEventPayload::PlayerLeft { player_id }))
    }

    fn next_dealer_seat(&self) -> SeatId {
        let occupied: Vec<SeatId> = self.state.occupied_seats();
        if occupied.is_empty() {
            return 0;
        }
        if self.state.hand_number == 0 {
            return occupied[0];
        }
        let max_seats = self.state.config.max_seats.max(1);
        let mut seat = self.state.dealer_seat;
        for _ in 0..max_seats {
            seat = (seat + 1) % max_seats;
            if occupied.contains(&seat) {
                return seat;
            }
        }
        self.state.dealer_seat
    }

    /// `start_hand()`: fails unless `WAITING` with ≥2 players holding
    /// chips; otherwise deals the hand and posts blinds.
    #[instrument(skip(self), target = LOG_TARGET)]
    pub async fn start_hand(&mut self, timestamp: i64) -> Result<Vec<TableEventEnvelope>, TableError> {
        if self.state.phase != TablePhase::Waiting {
            return Err(TableError::CannotStartHand);
        }
        let eligible: Vec<SeatId> = self
            .state
            .seats
            .values()
            .filter(|p| !p.sitting_out && p.chips > 0)
            .map(|p| p.seat)
            .collect();
        if eligible.len() < 2 {
            return Err(TableError::CannotStartHand);
        }

        let dealer_seat = self.next_dealer_seat();
        self.state.dealer_seat = dealer_seat;

        let max_seats = self.state.config.max_seats.max(1);
        let mut order = Vec::new();
        let mut seat = dealer_seat;
        for _ in 0..max_seats {
            seat = (seat + 1) % max_seats;
            if eligible.contains(&seat) {
                order.push(seat);
            }
        }

        let (sb_seat, bb_seat) = if order.len() == 2 {
            (dealer_seat, order[0])
        } else {
            (order[0], order[1])
        };

        let players: Vec<PlayerState> = eligible
            .iter()
            .map(|seat| {
                let seated = &self.state.seats[seat];
                PlayerState::new(seated.player_id, *seat, seated.chips)
            })
            .collect();

        let cfg = HandConfig {
            stakes: self.state.config.stakes.clone(),
            dealer_seat,
            sb_seat,
            bb_seat,
            max_seats,
        };

        let betting = nl_engine::new_after_deal(cfg.clone(), players);
        self.state.board.clear();
        self.state.hand_number += 1;
        self.state.betting = Some(betting);

        for (seat, player) in self.state.betting.as_ref().unwrap().players.iter().map(|p| (p.seat, p)) {
            if let Some(seated) = self.state.seats.get_mut(&seat) {
                seated.chips = player.chips;
            }
        }

        let mut events = vec![
            self.envelope(timestamp, TableEventPayload::GameStarted { dealer_seat }),
            self.envelope(
                timestamp,
                TableEventPayload::BlindsPosted { sb_seat, bb_seat, small_blind: cfg.stakes.small_blind, big_blind: cfg.stakes.big_blind },
            ),
        ];

        match dealing::deal_hole_cards(&mut self.state, self.deck_oracle.as_ref(), &self.registry, &self.abort_signal).await {
            Ok(handle) => {
                self.deck_handle = Some(handle);
                self.state.phase = TablePhase::PreFlop;
                events.push(self.envelope(timestamp, TableEventPayload::CardsDealt));
                self.sync_snapshot(timestamp);
                Ok(events)
            }
            Err(_) => {
                warn!(target: LOG_TARGET, "deck oracle unavailable mid-deal, refunding blinds");
                self.refund_and_finish(timestamp);
                Err(TableError::DeckUnavailable)
            }
        }
    }

    /// A Deck Oracle failure during dealing is fatal to the current hand;
    /// chips already committed (here, just the blinds) are refunded pro
    /// rata and the table moves straight to `FINISHED`.
    fn refund_and_finish(&mut self, timestamp: i64) {
        if let Some(betting) = self.state.betting.take() {
            for player in betting.players {
                if let Some(seated) = self.state.seats.get_mut(&player.seat) {
                    seated.chips = player.chips + player.current_bet_this_round + player.total_bet_this_hand;
                }
            }
        }
        self.state.phase = TablePhase::Finished;
        self.sync_snapshot(timestamp);
    }

    /// `apply_action(player_id, action)`.
    #[instrument(skip(self, action), target = LOG_TARGET)]
    pub async fn apply_action(&mut self, player_id: PlayerId, action: PlayerAction, timestamp: i64) -> Result<Vec<TableEventEnvelope>, TableError> {
        let seat = self.state.seat_of(player_id).ok_or(TableError::UnknownPlayer(player_id))?;
        let betting = self.state.betting.as_ref().ok_or(TableError::NoHandInProgress)?;

        if betting.to_act != seat {
            return Err(TableError::NotYourTurn);
        }

        nl_engine::validate(betting, seat, &action, &mut self.validation_cache)?;

        let role = PlayerRole::Player;
        self.synchronizer.record_action(PlayerActionRecord {
            player_id: player_id.to_string(),
            kind: action.kind(),
            amount: action.amount(),
            timestamp: timestamp as f64,
            player_role: role,
            authority_level: role.default_authority_level(),
        });

        let betting_mut = self.state.betting.as_mut().expect("checked above");
        let bet_before = betting_mut.player(seat).map(|p| p.current_bet_this_round).unwrap_or(0);
        let kind = action.kind();
        let amount = action.amount();
        let transition = nl_engine::apply_action(betting_mut, seat, action)?;
        self.reconcile_seated_chips();

        let bet_after = self
            .state
            .betting
            .as_ref()
            .and_then(|b| b.player(seat))
            .map(|p| p.current_bet_this_round)
            .unwrap_or(bet_before);
        let pot_contribution = bet_after.saturating_sub(bet_before);

        let mut events = vec![self.envelope(
            timestamp,
            TableEventPayload::ActionPerformed { player_id, kind, amount, pot_contribution },
        )];

        self.log_info("action applied", BTreeMap::from([("player_id".to_string(), Value::from(player_id.to_string()))]));

        match transition {
            Transition::Continued { .. } => {
                self.sync_snapshot(timestamp);
            }
            Transition::StreetComplete { .. } => {
                self.advance_or_showdown(timestamp, &mut events).await?;
            }
            Transition::HandEndedByFolds { winner, pots, .. } => {
                self.finish_hand_by_fold(winner, pots.total(), timestamp, &mut events).await;
            }
        }

        Ok(events)
    }

    async fn advance_or_showdown(&mut self, timestamp: i64, events: &mut Vec<TableEventEnvelope>) -> Result<(), TableError> {
        let current_street = self.state.betting.as_ref().expect("hand in progress").street;
        if current_street == Street::River {
            self.run_showdown(timestamp, events).await;
            return Ok(());
        }

        let next_street = nl_engine::advance_street(self.state.betting.as_mut().expect("hand in progress"))
            .expect("river already handled above");
        let count = community_card_count(next_street);
        let deck = self.deck_handle.ok_or(TableError::DeckUnavailable)?;

        dealing::burn_and_deal_community(&mut self.state, &deck, self.deck_oracle.as_ref(), &self.registry, &self.abort_signal, count)
            .await
            .map_err(|_| TableError::DeckUnavailable)?;

        self.state.phase = street_to_phase(next_street);
        events.push(self.envelope(
            timestamp,
            TableEventPayload::CommunityCardsDealt { phase: next_street, cards: self.state.board.clone() },
        ));
        events.push(self.envelope(timestamp, TableEventPayload::NewBettingRound { street: next_street }));
        self.sync_snapshot(timestamp);
        Ok(())
    }

    async fn run_showdown(&mut self, timestamp: i64, events: &mut Vec<TableEventEnvelope>) {
        self.state.phase = TablePhase::Showdown;
        let settlements = showdown::settle_showdown(&self.state);
        showdown::apply_settlements(&mut self.state, &settlements);

        let mut winners = Vec::new();
        for s in &settlements {
            let remainder = s.amount - s.per_winner * (s.winners.len().max(1) as Chips);
            for &seat in &s.winners {
                let amount = if Some(seat) == s.odd_chip_seat { s.per_winner + remainder } else { s.per_winner };
                let player_id = self.state.seats.get(&seat).map(|p| p.player_id).unwrap_or_default();
                winners.push(HandWinner { player_id, pot_index: s.pot_index, amount, ranking: s.ranking });
            }
        }

        self.record_hand_stats(&settlements, true).await;
        self.state.betting = None;

        self.state.phase = TablePhase::Finished;
        events.push(self.envelope(timestamp, TableEventPayload::HandCompleted { winners }));
        self.sync_snapshot(timestamp);
    }

    async fn finish_hand_by_fold(&mut self, winner_seat: SeatId, pot_total: Chips, timestamp: i64, events: &mut Vec<TableEventEnvelope>) {
        let winner_player_id = self.state.seats.get(&winner_seat).map(|p| p.player_id).unwrap_or_default();
        // A single winner-takes-all pot, shaped like a showdown settlement
        // so `record_hand_stats` doesn't need a second code path.
        let settlement = showdown::PotSettlement {
            pot_index: 0,
            amount: pot_total,
            winners: vec![winner_seat],
            per_winner: pot_total,
            odd_chip_seat: None,
            ranking: None,
        };
        self.record_hand_stats(std::slice::from_ref(&settlement), false).await;
        self.state.betting = None;

        if let Some(seated) = self.state.seats.get_mut(&winner_seat) {
            seated.chips += pot_total;
        }
        let winners = vec![HandWinner { player_id: winner_player_id, pot_index: 0, amount: pot_total, ranking: None }];
        self.state.phase = TablePhase::Finished;
        events.push(self.envelope(timestamp, TableEventPayload::HandCompleted { winners }));
        self.sync_snapshot(timestamp);
    }

    /// Persists per-player hand results; failures are logged and
    /// swallowed.
    async fn record_hand_stats(&self, settlements: &[showdown::PotSettlement], went_to_showdown: bool) {
        let hand_number = self.state.hand_number;
        let mut batch = Vec::new();
        for (seat, seated) in &self.state.seats {
            let won_amount: Chips = settlements
                .iter()
                .filter(|s| s.winners.contains(seat))
                .map(|s| if Some(*seat) == s.odd_chip_seat { s.per_winner + (s.amount - s.per_winner * s.winners.len().max(1) as Chips) } else { s.per_winner })
                .sum();
            let contributed = self
                .state
                .betting
                .as_ref()
                .and_then(|b| b.player(*seat))
                .map(|p| p.total_bet_this_hand + p.current_bet_this_round)
                .unwrap_or(0);
            let net_chips = won_amount as i64 - contributed as i64;
            let won_pot = won_amount > 0;
            batch.push(HandStats { hand_number, player_id: seated.player_id, net_chips, went_to_showdown, won_pot });
        }
        if let Err(err) = self.persistence.record_hand(&batch).await {
            warn!(target: LOG_TARGET, error = %err, "persistence failed to record hand stats");
        }
    }
}
