//! Client contract for the external secure-RNG / shuffle service. The core never implements shuffling itself — it treats
//! the oracle as opaque and only checks integrity by hash equality on
//! reveal, an injected collaborator behind a trait like every other
//! external service boundary in this crate.

mod memory;
mod types;

pub use memory::InMemoryDeckOracle;
pub use types::{DeckHandle, ShuffleProof, ShuffleRecord};

use crate::cards::Card;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeckOracleError {
    #[error("deck oracle unavailable: {0}")]
    Unavailable(String),
    #[error("shuffle proof failed integrity check")]
    IntegrityCheckFailed,
    #[error("requested {requested} cards but only {remaining} remain in the deck")]
    DeckExhausted { requested: usize, remaining: usize },
    #[error("unknown deck handle")]
    UnknownDeck,
}

/// `create_deck/commit/shuffle/deal/burn/reveal`. Every call can fail
/// transiently (it crosses a process boundary); callers wrap it with the
/// error-recovery fabric rather than retrying inline here.
#[async_trait]
pub trait DeckOracle: Send + Sync {
    async fn create_deck(&self, game_id: &str) -> Result<DeckHandle, DeckOracleError>;
    async fn commit(&self, deck: &DeckHandle, game_id: &str) -> Result<(), DeckOracleError>;
    async fn shuffle(&self, deck: &DeckHandle, game_id: &str) -> Result<ShuffleProof, DeckOracleError>;
    async fn deal(&self, deck: &DeckHandle, count: usize) -> Result<Vec<Card>, DeckOracleError>;
    async fn burn(&self, deck: &DeckHandle) -> Result<Card, DeckOracleError>;
    async fn reveal(&self, deck: &DeckHandle, game_id: &str) -> Result<Vec<ShuffleRecord>, DeckOracleError>;
}
