//! The versioned state synchronizer: owns the authoritative
//! snapshot for one table, tracks bounded history, and answers both the
//! "give me what changed" sync protocol and the "I reconnected" recovery
//! protocol. Grounded on `ledger::worker`'s actor-owns-state shape: a
//! single struct fully owns its snapshot and history, callers go through
//! its methods rather than mutating shared state directly.

pub mod apply;
pub mod conflict;
pub mod diff;
pub mod errors;
pub mod hash;
pub mod history;
pub mod protocol;
pub mod types;

pub use errors::SyncError;
pub use types::{Change, PlayerActionRecord, PlayerRole, Snapshot, StateDelta, SyncResponse};

use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::SyncConfig;
use history::{ActionLog, CompareCache, SnapshotHistory};
use protocol::RecoveryPlan;
use types::PlayerId;

/// Owns one table's authoritative state across its lifetime. Not
/// `Clone`: there is exactly one synchronizer per table, matching the
/// single-owner-task concurrency model.
pub struct StateSynchronizer {
    current: Snapshot,
    history: SnapshotHistory,
    action_log: ActionLog,
    compare_cache: CompareCache,
    config: SyncConfig,
}

impl StateSynchronizer {
    pub fn new(game_state: Value, player_states: BTreeMap<PlayerId, Value>, timestamp: i64, config: SyncConfig) -> Self {
        let hash = hash::compute_hash(&game_state, &player_states);
        let current = Snapshot { version: 0, hash, game_state, player_states, timestamp };
        let mut history = SnapshotHistory::new(config.history_cap, config.history_cap * 2);
        history.record_snapshot(current.clone());
        Self { current, history, action_log: ActionLog::default(), compare_cache: CompareCache::default(), config }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Replaces the current game/player state wholesale, bumps the
    /// version, recomputes the hash, and records both the new snapshot
    /// and the delta from the previous one into bounded history.
    pub fn apply_update(&mut self, game_state: Value, player_states: BTreeMap<PlayerId, Value>, timestamp: i64) -> StateDelta {
        let next_version = self.current.version + 1;
        let hash = hash::compute_hash(&game_state, &player_states);
        let next = Snapshot { version: next_version, hash, game_state, player_states, timestamp };

        let delta = diff::compute_delta(&self.current, &next, &mut self.compare_cache);
        self.history.record_snapshot(next.clone());
        self.history.record_delta(delta.clone());
        self.current = next;
        delta
    }

    pub fn record_action(&mut self, action: PlayerActionRecord) {
        self.action_log.record(action);
    }

    /// Answers the sync protocol for a client at `client_version`.
    pub fn sync_response(&mut self, client_version: u64) -> SyncResponse {
        protocol::build_sync_response(client_version, &self.current, &self.history, &self.config, &mut self.compare_cache)
    }

    /// Answers the recovery protocol for a reconnecting client.
    pub fn recover(&mut self, client_version: u64, client_hash: &str, client_timestamp: f64) -> Result<RecoveryPlan, SyncError> {
        protocol::plan_recovery(
            client_version,
            client_hash,
            client_timestamp,
            &self.current,
            &self.history,
            &self.action_log,
            &self.config,
            &mut self.compare_cache,
        )
    }

    /// Applies a delta a peer computed independently (e.g. a replicated
    /// follower reconstructing state from the wire) and adopts the
    /// result as current, after validating it.
    pub fn adopt_delta(&mut self, delta: &StateDelta) -> Result<(), SyncError> {
        let next = apply::apply_delta(&self.current, delta)?;
        protocol::validate_snapshot(&next)?;
        self.current = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn synchronizer() -> StateSynchronizer {
        StateSynchronizer::new(json!({"pot": 0, "street": "preflop"}), BTreeMap::new(), 0, SyncConfig::default())
    }

    #[test]
    fn apply_update_bumps_version_and_hash() {
        let mut sync = synchronizer();
        let v0_hash = sync.current().hash.clone();
        sync.apply_update(json!({"pot": 20, "street": "preflop"}), BTreeMap::new(), 1);
        assert_eq!(sync.current().version, 1);
        assert_ne!(sync.current().hash, v0_hash);
    }

    #[test]
    fn sync_response_is_a_delta_for_a_recent_client_version() {
        let mut sync = synchronizer();
        sync.apply_update(json!({"pot": 20, "street": "preflop"}), BTreeMap::new(), 1);
        let response = sync.sync_response(0);
        assert!(matches!(response, SyncResponse::Delta(_)));
    }

    #[test]
    fn adopting_a_delta_round_trips_through_apply_and_validate() {
        let mut producer = synchronizer();
        let delta = producer.apply_update(json!({"pot": 20, "street": "preflop"}), BTreeMap::new(), 1);

        let mut follower = synchronizer();
        follower.adopt_delta(&delta).unwrap();
        assert_eq!(follower.current().game_state, producer.current().game_state);
        assert_eq!(follower.current().hash, producer.current().hash);
    }
}
