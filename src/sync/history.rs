//! Bounded ring history for snapshots, deltas, and the action log, plus the comparison cache. Grounded on `engine::nl::cache::ValidationCache`'s
//! insertion-order-eviction shape (`VecDeque` tracking insertion order,
//! oldest-10%-evicted once a soft cap is hit) applied to plain ring
//! buffers instead of a keyed cache.

use std::collections::VecDeque;

use super::types::{PlayerActionRecord, Snapshot, StateDelta};

const DEFAULT_SNAPSHOT_CAP: usize = 50;
const DEFAULT_DELTA_CAP: usize = 100;
const DEFAULT_ACTION_LOG_CAP: usize = 200;
const DEFAULT_COMPARE_CACHE_CAP: usize = 1000;

/// A fixed-capacity FIFO ring buffer. Pushing past `cap` drops the oldest
/// entry.
#[derive(Debug, Clone)]
pub struct Ring<T> {
    cap: usize,
    items: VecDeque<T>,
}

impl<T> Ring<T> {
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "ring capacity must be positive");
        Self { cap, items: VecDeque::with_capacity(cap) }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.cap {
            self.items.pop_front();
        }
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn back(&self) -> Option<&T> {
        self.items.back()
    }
}

/// Snapshot and delta history, sized by documented defaults but
/// overridable from `CoreConfig::sync`.
pub struct SnapshotHistory {
    snapshots: Ring<Snapshot>,
    deltas: Ring<StateDelta>,
}

impl SnapshotHistory {
    pub fn new(snapshot_cap: usize, delta_cap: usize) -> Self {
        Self { snapshots: Ring::new(snapshot_cap.max(1)), deltas: Ring::new(delta_cap.max(1)) }
    }

    pub fn record_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn record_delta(&mut self, delta: StateDelta) {
        self.deltas.push(delta);
    }

    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    /// Finds the snapshot with the given version, if it's still in the
    /// retained window.
    pub fn snapshot_at(&self, version: u64) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.version == version)
    }

    /// Deltas whose `from_version` is at least `since_version`, in order,
    /// used to replay forward from an older client version.
    pub fn deltas_since(&self, since_version: u64) -> Vec<&StateDelta> {
        self.deltas.iter().filter(|d| d.from_version >= since_version).collect()
    }
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_CAP, DEFAULT_DELTA_CAP)
    }
}

/// The append-only per-hand action log used for recovery's "buffered
/// actions newer than the client's last known state".
pub struct ActionLog {
    actions: Ring<PlayerActionRecord>,
}

impl ActionLog {
    pub fn new(cap: usize) -> Self {
        Self { actions: Ring::new(cap.max(1)) }
    }

    pub fn record(&mut self, action: PlayerActionRecord) {
        self.actions.push(action);
    }

    pub fn since_timestamp(&self, timestamp: f64) -> Vec<&PlayerActionRecord> {
        self.actions.iter().filter(|a| a.timestamp > timestamp).collect()
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTION_LOG_CAP)
    }
}

/// Comparison cache keyed by `(path, old-subtree-hash, new-subtree-hash)`.
/// `serde_json::Value` has no JS-style object identity, so "has this
/// subtree changed" is approximated with a content hash of each subtree
/// at that path.
pub struct CompareCache {
    soft_cap: usize,
    order: VecDeque<(String, u64, u64)>,
    results: std::collections::HashMap<(String, u64, u64), bool>,
}

impl CompareCache {
    pub fn new(soft_cap: usize) -> Self {
        Self { soft_cap: soft_cap.max(1), order: VecDeque::new(), results: std::collections::HashMap::new() }
    }

    pub fn get(&self, path: &str, old_hash: u64, new_hash: u64) -> Option<bool> {
        self.results.get(&(path.to_string(), old_hash, new_hash)).copied()
    }

    pub fn insert(&mut self, path: String, old_hash: u64, new_hash: u64, equal: bool) {
        let key = (path, old_hash, new_hash);
        if self.results.insert(key.clone(), equal).is_none() {
            self.order.push_back(key);
            if self.order.len() > self.soft_cap {
                self.evict_oldest_tenth();
            }
        }
    }

    fn evict_oldest_tenth(&mut self) {
        let to_evict = (self.order.len() / 10).max(1);
        for _ in 0..to_evict {
            if let Some(key) = self.order.pop_front() {
                self.results.remove(&key);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

impl Default for CompareCache {
    fn default() -> Self {
        Self::new(DEFAULT_COMPARE_CACHE_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_drops_oldest_past_capacity() {
        let mut ring: Ring<u32> = Ring::new(3);
        for i in 0..5 {
            ring.push(i);
        }
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    #[test]
    fn compare_cache_evicts_oldest_tenth_past_soft_cap() {
        let mut cache = CompareCache::new(10);
        for i in 0..11u64 {
            cache.insert(format!("path{i}"), i, i, true);
        }
        assert!(cache.len() < 11);
        assert!(cache.get("path0", 0, 0).is_none());
    }

    #[test]
    fn action_log_filters_strictly_after_timestamp() {
        let mut log = ActionLog::new(10);
        log.record(PlayerActionRecord {
            player_id: "p1".into(),
            kind: crate::engine::nl::ActionKind::Fold,
            amount: None,
            timestamp: 10.0,
            player_role: super::super::types::PlayerRole::Player,
            authority_level: 1,
        });
        assert_eq!(log.since_timestamp(5.0).len(), 1);
        assert_eq!(log.since_timestamp(10.0).len(), 0);
    }
}
