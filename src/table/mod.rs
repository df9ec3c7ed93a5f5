//! The table engine: one actor per table driving the
//! WAITING→...→FINISHED hand lifecycle on top of the betting engine
//! (`engine::nl`), the dealing protocol against a `DeckOracle`, and the
//! state synchronizer.

pub mod dealing;
pub mod engine;
pub mod errors;
pub mod events;
pub mod showdown;
pub mod types;
pub mod view;

pub use engine::TableEngine;
pub use errors::TableError;
pub use events::{HandWinner, TableEventEnvelope, TableEventPayload};
pub use types::{SeatedPlayer, TableConfig, TablePhase, TableState};

#[cfg(test)]
mod tests;
