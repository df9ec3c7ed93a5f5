//! The statistics/persistence collaborator:
//! `begin_session`, `end_session`, `record_hand`. An out-of-process external
//! system — the core only needs its trait boundary and the "failures are
//! non-fatal to the table engine" contract, wrapped by the resilience
//! fabric like every other collaborator call. Shaped the same way as
//! `deck_oracle`'s trait-plus-in-memory-impl.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::engine::nl::types::{Chips, PlayerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("persistence backend unavailable: {0}")]
    Unavailable(String),
    #[error("unknown session")]
    UnknownSession,
}

/// One hand's worth of per-player results, batched so a single
/// `record_hand` call covers an entire showdown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandStats {
    pub hand_number: u64,
    pub player_id: PlayerId,
    pub net_chips: i64,
    pub went_to_showdown: bool,
    pub won_pot: bool,
}

/// `begin_session/end_session/record_hand`. Every method is fallible
/// because it crosses a process boundary; callers are expected to treat
/// failures as non-fatal to the hand in progress — typically by
/// wrapping calls with `resilience::call_guarded` and logging on failure
/// rather than propagating it into `apply_action`'s result.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    async fn begin_session(
        &self,
        player_id: PlayerId,
        table_id: &str,
        buy_in: Chips,
        starting_chips: Chips,
    ) -> Result<SessionId, PersistenceError>;

    async fn end_session(&self, session_id: SessionId, cash_out: Chips) -> Result<(), PersistenceError>;

    async fn record_hand(&self, batch: &[HandStats]) -> Result<(), PersistenceError>;
}

/// In-process stand-in used by tests and the demo binary when no real
/// statistics backend is configured.
#[derive(Default)]
pub struct InMemoryPersistence {
    inner: parking_lot::Mutex<InMemoryState>,
}

#[derive(Default)]
struct InMemoryState {
    sessions: std::collections::HashMap<Uuid, (PlayerId, Chips)>,
    recorded_hands: Vec<HandStats>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded_hands(&self) -> Vec<HandStats> {
        self.inner.lock().recorded_hands.clone()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistence {
    async fn begin_session(
        &self,
        player_id: PlayerId,
        _table_id: &str,
        buy_in: Chips,
        _starting_chips: Chips,
    ) -> Result<SessionId, PersistenceError> {
        let id = SessionId::new();
        self.inner.lock().sessions.insert(id.0, (player_id, buy_in));
        Ok(id)
    }

    async fn end_session(&self, session_id: SessionId, _cash_out: Chips) -> Result<(), PersistenceError> {
        let mut inner = self.inner.lock();
        inner.sessions.remove(&session_id.0).ok_or(PersistenceError::UnknownSession)?;
        Ok(())
    }

    async fn record_hand(&self, batch: &[HandStats]) -> Result<(), PersistenceError> {
        self.inner.lock().recorded_hands.extend_from_slice(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn session_lifecycle_round_trips() {
        let store = InMemoryPersistence::new();
        let id = store.begin_session(1, "table-1", 100, 100).await.unwrap();
        store.end_session(id, 150).await.unwrap();
        assert!(matches!(store.end_session(id, 0).await, Err(PersistenceError::UnknownSession)));
    }

    #[tokio::test]
    async fn record_hand_accumulates_batches() {
        let store = InMemoryPersistence::new();
        store
            .record_hand(&[HandStats { hand_number: 1, player_id: 1, net_chips: 15, went_to_showdown: false, won_pot: true }])
            .await
            .unwrap();
        assert_eq!(store.recorded_hands().len(), 1);
    }
}
