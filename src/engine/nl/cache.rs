use super::actions::ActionKind;
use super::errors::ActionError;
use super::types::{Chips, PlayerId, Street};
use std::collections::{HashMap, VecDeque};

/// Validation cache: repeated `validate(action, context)` calls with
/// an identical `(kind, amount, player_id, current_bet, phase)` key return
/// the same verdict without re-running the legality math. Soft cap 5,000
/// entries; once exceeded, the oldest ~10% are evicted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: ActionKind,
    pub amount: Option<Chips>,
    pub player_id: PlayerId,
    pub current_bet: Chips,
    pub phase: Street,
}

pub type CachedVerdict = Result<(), ActionError>;

pub struct ValidationCache {
    soft_cap: usize,
    entries: HashMap<CacheKey, CachedVerdict>,
    insertion_order: VecDeque<CacheKey>,
}

impl Default for ValidationCache {
    fn default() -> Self {
        Self::new(5_000)
    }
}

impl ValidationCache {
    pub fn new(soft_cap: usize) -> Self {
        Self {
            soft_cap,
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedVerdict> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: CacheKey, verdict: CachedVerdict) {
        if self.entries.insert(key.clone(), verdict).is_none() {
            self.insertion_order.push_back(key);
        }
        if self.entries.len() > self.soft_cap {
            self.evict_oldest_tenth();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest_tenth(&mut self) {
        let to_evict = (self.soft_cap / 10).max(1);
        for _ in 0..to_evict {
            if let Some(key) = self.insertion_order.pop_front() {
                self.entries.remove(&key);
            } else {
                break;
            }
        }
    }
}
