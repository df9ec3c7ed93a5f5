//! Delta application: walks a `StateDelta`'s changes back onto a
//! `Snapshot`. Path segments are treated as
//! opaque strings split on `.`, including the player id segment in
//! `playerStates.<id>.<field>` — an id containing a literal `.` would be
//! valid input (player ids are caller-supplied strings) and would simply
//! produce a path with more segments than expected. This crate's
//! `PlayerId` is numeric and renders as decimal ASCII, which never
//! contains `.`, so no escaping is needed here.

use serde_json::{Map, Value};

use super::errors::SyncError;
use super::hash::compute_hash;
use super::types::{Snapshot, StateDelta};

const PLAYER_STATES_PREFIX: &str = "playerStates";

/// Sets or removes (`new == None`) the value at `segments` inside `root`,
/// creating intermediate objects as needed. The final segment is where
/// the leaf actually lives.
fn set_path(root: &mut Value, segments: &[&str], new: Option<&Value>) -> Result<(), SyncError> {
    let Some((last, init)) = segments.split_last() else {
        return Err(SyncError::UnknownPath("empty path".to_string()));
    };

    let mut cursor = root;
    for segment in init {
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
        let map = cursor.as_object_mut().expect("just ensured object");
        cursor = map.entry(segment.to_string()).or_insert_with(|| Value::Object(Map::new()));
    }

    if !cursor.is_object() {
        *cursor = Value::Object(Map::new());
    }
    let map = cursor.as_object_mut().expect("just ensured object");
    match new {
        Some(value) => {
            map.insert(last.to_string(), value.clone());
        }
        None => {
            map.remove(*last);
        }
    }
    Ok(())
}

/// Applies a single `Change` onto `snapshot`'s `game_state` or the right
/// entry of `player_states`, depending on whether the path starts with
/// `playerStates.`.
fn apply_change(snapshot: &mut Snapshot, change: &super::types::Change) -> Result<(), SyncError> {
    let segments: Vec<&str> = change.path.split('.').collect();

    if segments.first() == Some(&PLAYER_STATES_PREFIX) {
        if segments.len() < 2 {
            return Err(SyncError::UnknownPath(change.path.clone()));
        }
        let player_id = segments[1].to_string();
        let rest = &segments[2..];
        if rest.is_empty() {
            match &change.new {
                Some(value) => {
                    snapshot.player_states.insert(player_id, value.clone());
                }
                None => {
                    snapshot.player_states.remove(&player_id);
                }
            }
            return Ok(());
        } else {
            let entry = snapshot.player_states.entry(player_id).or_insert_with(|| Value::Object(Map::new()));
            set_path(entry, rest, change.new.as_ref())?;
        }
    } else {
        set_path(&mut snapshot.game_state, &segments, change.new.as_ref())?;
    }
    Ok(())
}

/// Applies `delta` to `snapshot`, checking the version precondition
/// and recomputing the hash afterward rather than trusting a hash the
/// delta might carry.
pub fn apply_delta(snapshot: &Snapshot, delta: &StateDelta) -> Result<Snapshot, SyncError> {
    if delta.from_version != snapshot.version {
        return Err(SyncError::VersionMismatch { expected: delta.from_version, actual: snapshot.version });
    }

    let mut next = snapshot.clone();
    for change in &delta.changes {
        apply_change(&mut next, change)?;
    }
    next.version = delta.to_version;
    next.hash = compute_hash(&next.game_state, &next.player_states);
    Ok(next)
}
