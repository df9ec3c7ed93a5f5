//! The betting validator/executor: legality rules for
//! fold/check/call/bet/raise/all-in, a validation cache, and side-pot
//! computation, laid out as types/state/seating/errors/events/actions/
//! legals/rules/engine with tagged-variant (not trait-object) dispatch
//! per action kind in `engine.rs`.

pub mod actions;
pub mod cache;
pub mod engine;
pub mod errors;
pub mod events;
pub mod legals;
pub mod pots;
pub mod rules;
pub mod seating;
pub mod state;
pub mod types;

pub use actions::*;
pub use cache::*;
pub use engine::*;
pub use errors::*;
pub use events::*;
pub use legals::*;
pub use pots::*;
pub use rules::*;
pub use seating::*;
pub use state::*;
pub use types::*;
