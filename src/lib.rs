//! Core server-side runtime of a multi-table poker platform: the
//! per-table authoritative game engine plus the cross-cutting reliability
//! and synchronization machinery that lets many tables run concurrently,
//! survive partial failures, and keep remote observers in agreement with
//! server truth. HTTP/WebSocket ingress, the lobby, persistence
//! repositories, the secure-RNG service, tournament scheduling, and
//! authentication are external collaborators whose interfaces this crate
//! names but does not implement (see `deck_oracle`, `persistence`,
//! `logging`).

pub mod cards;
pub mod config;
pub mod deck_oracle;
pub mod engine;
pub mod handeval;
pub mod logging;
pub mod persistence;
pub mod resilience;
pub mod sync;
pub mod table;

#[cfg(test)]
pub mod test_support;
