//! Recursive structural diff producing a `StateDelta` from two snapshots:
//! walks the tree and only emits leaves that actually changed.

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde_json::Value;

use super::history::CompareCache;
use super::types::{Change, PlayerId, Snapshot, StateDelta};

fn subtree_hash(value: Option<&Value>) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    match value {
        Some(v) => {
            let bytes = serde_json::to_vec(v).unwrap_or_default();
            bytes.hash(&mut hasher);
        }
        None => "\u{0}none".hash(&mut hasher),
    }
    hasher.finish()
}

/// Diffs `old` against `new` at `path`, appending leaf-level `Change`s to
/// `changes`. Objects recurse key-by-key over the sorted union of both
/// sides' keys; everything else (arrays, scalars, type changes,
/// presence/absence) is a single replace at `path`.
fn diff_value(path: &str, old: Option<&Value>, new: Option<&Value>, changes: &mut Vec<Change>, cache: &mut CompareCache) {
    let old_hash = subtree_hash(old);
    let new_hash = subtree_hash(new);

    if let Some(equal) = cache.get(path, old_hash, new_hash) {
        if equal {
            return;
        }
    } else {
        let equal = old == new;
        cache.insert(path.to_string(), old_hash, new_hash, equal);
        if equal {
            return;
        }
    }

    match (old, new) {
        (Some(Value::Object(old_map)), Some(Value::Object(new_map))) => {
            let mut keys: BTreeSet<&String> = BTreeSet::new();
            keys.extend(old_map.keys());
            keys.extend(new_map.keys());
            for key in keys {
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                diff_value(&child_path, old_map.get(key), new_map.get(key), changes, cache);
            }
        }
        _ => {
            changes.push(Change { path: path.to_string(), old: old.cloned(), new: new.cloned() });
        }
    }
}

fn diff_player_states(
    old: &BTreeMap<PlayerId, Value>,
    new: &BTreeMap<PlayerId, Value>,
    changes: &mut Vec<Change>,
    cache: &mut CompareCache,
) {
    let mut ids: BTreeSet<&PlayerId> = BTreeSet::new();
    ids.extend(old.keys());
    ids.extend(new.keys());
    for id in ids {
        let base = format!("playerStates.{id}");
        diff_value(&base, old.get(id), new.get(id), changes, cache);
    }
}

/// Produces the `StateDelta` carrying every leaf that changed between two
/// snapshots, using `cache` to skip subtrees already known equal/unequal
/// at the same path.
pub fn compute_delta(old: &Snapshot, new: &Snapshot, cache: &mut CompareCache) -> StateDelta {
    let mut changes = Vec::new();
    diff_value("", Some(&old.game_state), Some(&new.game_state), &mut changes, cache);
    diff_player_states(&old.player_states, &new.player_states, &mut changes, cache);
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    StateDelta { from_version: old.version, to_version: new.version, changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(version: u64, pot: i64, street: &str, players: Vec<(&str, i64)>) -> Snapshot {
        let mut player_states = BTreeMap::new();
        for (id, chips) in players {
            player_states.insert(id.to_string(), json!({"chips": chips}));
        }
        Snapshot {
            version,
            hash: String::new(),
            game_state: json!({"pot": pot, "street": street}),
            player_states,
            timestamp: 0,
        }
    }

    #[test]
    fn unchanged_fields_produce_no_change() {
        let s1 = snapshot(1, 100, "flop", vec![("p1", 500)]);
        let s2 = snapshot(2, 100, "flop", vec![("p1", 500)]);
        let mut cache = CompareCache::default();
        let delta = compute_delta(&s1, &s2, &mut cache);
        assert!(delta.changes.is_empty());
    }

    #[test]
    fn changed_game_state_field_is_a_single_leaf_change() {
        let s1 = snapshot(1, 100, "flop", vec![]);
        let s2 = snapshot(2, 150, "flop", vec![]);
        let mut cache = CompareCache::default();
        let delta = compute_delta(&s1, &s2, &mut cache);
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "pot");
        assert_eq!(delta.changes[0].new, Some(json!(150)));
    }

    #[test]
    fn player_state_changes_are_scoped_per_player_per_field() {
        let s1 = snapshot(1, 100, "flop", vec![("p1", 500), ("p2", 500)]);
        let s2 = snapshot(2, 100, "flop", vec![("p1", 400), ("p2", 500)]);
        let mut cache = CompareCache::default();
        let delta = compute_delta(&s1, &s2, &mut cache);
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "playerStates.p1.chips");
    }

    #[test]
    fn array_fields_are_replaced_wholesale_not_diffed_positionally() {
        let mut s1 = snapshot(1, 100, "flop", vec![]);
        s1.game_state = json!({"board": ["Ah", "Kd"]});
        let mut s2 = s1.clone();
        s2.version = 2;
        s2.game_state = json!({"board": ["Ah", "Kd", "2c"]});
        let mut cache = CompareCache::default();
        let delta = compute_delta(&s1, &s2, &mut cache);
        assert_eq!(delta.changes.len(), 1);
        assert_eq!(delta.changes[0].path, "board");
    }
}
