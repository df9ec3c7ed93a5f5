//! Sync response selection: given a client's last
//! known version and the server's current snapshot, decide whether to
//! send a full snapshot or a delta, plus the recovery path for a client
//! announcing its own version/hash.

use super::diff::compute_delta;
use super::errors::SyncError;
use super::hash::compute_hash;
use super::history::{CompareCache, SnapshotHistory};
use super::types::{PlayerActionRecord, Snapshot, SyncResponse};
use crate::config::SyncConfig;

/// Decides full-snapshot vs delta for a client reporting `client_version`.
/// `history` supplies the snapshot the client is assumed to
/// hold; if it has aged out of history, a full snapshot is the only
/// option regardless of the gap.
pub fn build_sync_response(
    client_version: u64,
    current: &Snapshot,
    history: &SnapshotHistory,
    config: &SyncConfig,
    cache: &mut CompareCache,
) -> SyncResponse {
    if client_version >= current.version {
        return SyncResponse::Snapshot(current.clone());
    }

    let gap = current.version - client_version;
    if gap > config.version_diff_threshold {
        return SyncResponse::Snapshot(current.clone());
    }

    let Some(client_snapshot) = history.snapshot_at(client_version) else {
        return SyncResponse::Snapshot(current.clone());
    };

    let delta = compute_delta(client_snapshot, current, cache);
    let encoded_len = serde_json::to_vec(&delta).map(|b| b.len()).unwrap_or(usize::MAX);
    if encoded_len > config.max_delta_bytes {
        return SyncResponse::Snapshot(current.clone());
    }

    SyncResponse::Delta(delta)
}

/// Well-formedness validation for an incoming snapshot.
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<(), SyncError> {
    if !snapshot.game_state.is_object() {
        return Err(SyncError::InvalidSnapshot("game_state must be a JSON object"));
    }

    if let Some(pot) = snapshot.game_state.get("pot") {
        if pot.as_i64().map(|v| v < 0).unwrap_or(false) {
            return Err(SyncError::InvalidSnapshot("pot must be non-negative"));
        }
    }

    for (_, player) in snapshot.player_states.iter() {
        if let Some(chips) = player.get("chips") {
            if chips.as_i64().map(|v| v < 0).unwrap_or(false) {
                return Err(SyncError::InvalidSnapshot("player chips must be non-negative"));
            }
        }
    }

    let recomputed = compute_hash(&snapshot.game_state, &snapshot.player_states);
    if recomputed != snapshot.hash {
        return Err(SyncError::HashMismatch { recomputed, stored: snapshot.hash.clone() });
    }

    Ok(())
}

/// What a reconnecting client gets back: a delta or snapshot per
/// `build_sync_response`, plus any actions the server recorded after the
/// client's own timestamp.
pub struct RecoveryPlan {
    pub response: SyncResponse,
    pub buffered_actions: Vec<PlayerActionRecord>,
}

#[allow(clippy::too_many_arguments)]
pub fn plan_recovery(
    client_version: u64,
    client_hash: &str,
    client_timestamp: f64,
    current: &Snapshot,
    history: &SnapshotHistory,
    action_log: &super::history::ActionLog,
    config: &SyncConfig,
    cache: &mut CompareCache,
) -> Result<RecoveryPlan, SyncError> {
    if client_version > current.version {
        return Err(SyncError::Unrecoverable("client reports a version ahead of the server"));
    }

    if client_version == current.version && client_hash != current.hash {
        return Err(SyncError::HashMismatch { recomputed: current.hash.clone(), stored: client_hash.to_string() });
    }

    let response = build_sync_response(client_version, current, history, config, cache);
    let buffered_actions = action_log.since_timestamp(client_timestamp).into_iter().cloned().collect();
    Ok(RecoveryPlan { response, buffered_actions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::PlayerRole;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn snapshot(version: u64, pot: i64) -> Snapshot {
        let game_state = json!({"pot": pot});
        let player_states = BTreeMap::new();
        let hash = compute_hash(&game_state, &player_states);
        Snapshot { version, hash, game_state, player_states, timestamp: version as i64 }
    }

    #[test]
    fn client_already_current_gets_the_current_snapshot_back() {
        let current = snapshot(5, 100);
        let history = SnapshotHistory::default();
        let mut cache = CompareCache::default();
        let response = build_sync_response(5, &current, &history, &SyncConfig::default(), &mut cache);
        assert!(matches!(response, SyncResponse::Snapshot(_)));
    }

    #[test]
    fn small_gap_with_retained_history_produces_a_delta() {
        let mut history = SnapshotHistory::default();
        let old = snapshot(1, 10);
        history.record_snapshot(old.clone());
        let current = snapshot(2, 20);
        let mut cache = CompareCache::default();
        let response = build_sync_response(1, &current, &history, &SyncConfig::default(), &mut cache);
        assert!(matches!(response, SyncResponse::Delta(_)));
    }

    #[test]
    fn gap_beyond_threshold_forces_a_full_snapshot() {
        let history = SnapshotHistory::default();
        let current = snapshot(100, 10);
        let mut cache = CompareCache::default();
        let cfg = SyncConfig { version_diff_threshold: 5, ..SyncConfig::default() };
        let response = build_sync_response(1, &current, &history, &cfg, &mut cache);
        assert!(matches!(response, SyncResponse::Snapshot(_)));
    }

    #[test]
    fn validate_rejects_tampered_hash() {
        let mut snap = snapshot(1, 10);
        snap.hash = "deadbeef".to_string();
        assert!(matches!(validate_snapshot(&snap), Err(SyncError::HashMismatch { .. })));
    }

    #[test]
    fn validate_rejects_negative_pot() {
        let snap = snapshot(1, -5);
        assert!(matches!(validate_snapshot(&snap), Err(SyncError::InvalidSnapshot(_))));
    }

    #[test]
    fn recovery_returns_buffered_actions_after_client_timestamp() {
        let current = snapshot(2, 20);
        let history = SnapshotHistory::default();
        let mut action_log = super::super::history::ActionLog::default();
        action_log.record(PlayerActionRecord {
            player_id: "p1".into(),
            kind: crate::engine::nl::ActionKind::Call,
            amount: Some(20),
            timestamp: 5.0,
            player_role: PlayerRole::Player,
            authority_level: 1,
        });
        let mut cache = CompareCache::default();
        let plan = plan_recovery(2, &current.hash, 1.0, &current, &history, &action_log, &SyncConfig::default(), &mut cache).unwrap();
        assert_eq!(plan.buffered_actions.len(), 1);
    }
}
