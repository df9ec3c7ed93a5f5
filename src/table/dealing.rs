//! Dealing protocol: request a shuffled deck,
//! deal two hole cards per seated non-sitting-out player in two rounds,
//! and burn-plus-deal community cards entering FLOP/TURN/RIVER. Every
//! oracle call goes through `resilience::call_guarded`.

use crate::cards::Card;
use crate::deck_oracle::{DeckHandle, DeckOracle, DeckOracleError};
use crate::engine::nl::types::SeatId;
use crate::resilience::{call_guarded, AbortSignal, ErrorClass, ResilienceRegistry};

use super::errors::TableError;
use super::types::TableState;

const DECK_ORACLE_RESOURCE: &str = "deck_oracle";

fn classify_deck_oracle_error(err: &DeckOracleError) -> ErrorClass {
    crate::resilience::classify(&err.to_string(), None)
}

async fn guarded_call<T, F, Fut>(registry: &ResilienceRegistry, signal: &AbortSignal, op: F) -> Result<T, TableError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, DeckOracleError>>,
{
    call_guarded(registry, DECK_ORACLE_RESOURCE, classify_deck_oracle_error, signal, op)
        .await
        .map_err(|_| TableError::DeckUnavailable)
}

/// Seats dealt in, starting left of the dealer, skipping sitting-out
/// players.
fn deal_order(state: &TableState) -> Vec<SeatId> {
    let max_seats = state.config.max_seats.max(1);
    let mut order = Vec::new();
    let mut seat = state.dealer_seat;
    for _ in 0..max_seats {
        seat = (seat + 1) % max_seats;
        if let Some(p) = state.seats.get(&seat) {
            if !p.sitting_out {
                order.push(seat);
            }
        }
    }
    order
}

/// Requests a fresh deck, commits and shuffles it, then deals two hole
/// cards per active seat in two rounds. On any oracle failure the
/// deck is abandoned and `TableError::DeckUnavailable` is returned — the
/// caller (the table engine) treats this as fatal to the current hand and
/// refunds contributed chips pro rata.
pub async fn deal_hole_cards(
    state: &mut TableState,
    oracle: &dyn DeckOracle,
    registry: &ResilienceRegistry,
    signal: &AbortSignal,
) -> Result<DeckHandle, TableError> {
    let game_id = state.config.table_id.clone();

    let deck = guarded_call(registry, signal, || {
        let game_id = game_id.clone();
        async move { oracle.create_deck(&game_id).await }
    })
    .await?;

    guarded_call(registry, signal, || {
        let game_id = game_id.clone();
        async move { oracle.commit(&deck, &game_id).await }
    })
    .await?;

    guarded_call(registry, signal, || {
        let game_id = game_id.clone();
        async move { oracle.shuffle(&deck, &game_id).await }
    })
    .await?;

    let order = deal_order(state);
    let mut hole_cards: std::collections::HashMap<SeatId, Vec<Card>> = order.iter().map(|s| (*s, Vec::with_capacity(2))).collect();

    for _round in 0..2 {
        for &seat in &order {
            let mut dealt = guarded_call(registry, signal, || async { oracle.deal(&deck, 1).await }).await?;
            let Some(card) = dealt.pop() else {
                return Err(TableError::DeckUnavailable);
            };
            hole_cards.entry(seat).or_default().push(card);
        }
    }

    for (seat, cards) in hole_cards {
        if let [a, b] = cards[..] {
            if let Some(player) = state.seats.get_mut(&seat) {
                player.hole_cards = Some([a, b]);
            }
        }
    }

    Ok(deck)
}

/// Burns one card then deals `count` community cards onto the board.
pub async fn burn_and_deal_community(
    state: &mut TableState,
    deck: &DeckHandle,
    oracle: &dyn DeckOracle,
    registry: &ResilienceRegistry,
    signal: &AbortSignal,
    count: usize,
) -> Result<(), TableError> {
    guarded_call(registry, signal, || async { oracle.burn(deck).await }).await?;
    let cards = guarded_call(registry, signal, || async { oracle.deal(deck, count).await }).await?;
    state.board.extend(cards);
    Ok(())
}
