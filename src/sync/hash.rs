//! Content-addressed hashing for snapshots: hash a deterministic byte
//! encoding of the state. serde_json's lexicographically-sorted object
//! keys give a canonical encoding for free, since this synchronizer's
//! state is already JSON-shaped — no bespoke field-by-field writer
//! needed.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::types::PlayerId;

/// The exact bytes that get hashed: `game_state` plus the player map,
/// sorted.
pub fn canonical_encoding(game_state: &Value, player_states: &BTreeMap<PlayerId, Value>) -> Vec<u8> {
    let envelope = serde_json::json!({
        "game_state": game_state,
        "player_states": player_states,
    });
    serde_json::to_vec(&envelope).expect("canonical encoding is infallible for Value trees")
}

pub fn compute_hash(game_state: &Value, player_states: &BTreeMap<PlayerId, Value>) -> String {
    let bytes = canonical_encoding(game_state, player_states);
    let digest = Sha256::digest(&bytes);
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_trees_hash_identically_regardless_of_key_insertion_order() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        let players = BTreeMap::new();
        assert_eq!(compute_hash(&a, &players), compute_hash(&b, &players));
    }

    #[test]
    fn changing_a_value_changes_the_hash() {
        let players = BTreeMap::new();
        let h1 = compute_hash(&json!({"pot": 10}), &players);
        let h2 = compute_hash(&json!({"pot": 30}), &players);
        assert_ne!(h1, h2);
    }
}
