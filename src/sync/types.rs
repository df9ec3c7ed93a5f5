//! `Snapshot`, `StateDelta`, and `PlayerAction record`.
//! `game_state` and each player's state are kept as `serde_json::Value`
//! trees rather than a fixed struct: the synchronizer is generic over
//! whatever shape the table engine's state happens to be, and the wire
//! format is JSON regardless. `serde_json::Map`
//! (this crate builds without the `preserve_order` feature) is backed by
//! a `BTreeMap`, so "JSON with object keys sorted lexicographically" falls out of normal serialization for free.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type PlayerId = String;

/// `{version, hash, game_state, player_states_map, timestamp}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u64,
    pub hash: String,
    pub game_state: Value,
    pub player_states: BTreeMap<PlayerId, Value>,
    pub timestamp: i64,
}

/// A single field-level change. `new` of `None` denotes removal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

/// `{from_version, to_version, changes[]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDelta {
    pub from_version: u64,
    pub to_version: u64,
    pub changes: Vec<Change>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SyncResponse {
    Snapshot(Snapshot),
    Delta(StateDelta),
}

/// `ADMIN=3, DEALER=2, PLAYER=1` by default, carried on each action
/// record to break authority-based conflicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerRole {
    Player,
    Dealer,
    Admin,
}

impl PlayerRole {
    pub fn default_authority_level(self) -> u8 {
        match self {
            PlayerRole::Admin => 3,
            PlayerRole::Dealer => 2,
            PlayerRole::Player => 1,
        }
    }
}

/// `{player_id, kind, amount?, timestamp, player_role, authority_level}`.
/// `timestamp` keeps sub-second precision (seconds, fractional) so
/// AUTHORITY_BASED resolution can break ties on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerActionRecord {
    pub player_id: PlayerId,
    pub kind: crate::engine::nl::ActionKind,
    pub amount: Option<u64>,
    pub timestamp: f64,
    pub player_role: PlayerRole,
    pub authority_level: u8,
}

impl PlayerActionRecord {
    /// The integer-second bucket conflict detection and AUTHORITY_BASED
    /// resolution both group actions on.
    pub fn integer_timestamp(&self) -> i64 {
        self.timestamp.floor() as i64
    }
}
