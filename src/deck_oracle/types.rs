use crate::cards::Card;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to a deck owned by the oracle. The table engine never
/// inspects deck contents directly outside of `deal`/`burn` results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeckHandle(pub Uuid);

impl DeckHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeckHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// `{original_hash, shuffled_hash, entropy_used≥256 bits, algorithm_name}`.
/// The core validates integrity by hash equality on reveal; it never
/// inspects `algorithm_name` or verifies the shuffle cryptographically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleProof {
    pub original_hash: [u8; 32],
    pub shuffled_hash: [u8; 32],
    pub entropy_used_bits: u32,
    pub algorithm_name: String,
}

impl ShuffleProof {
    pub fn meets_minimum_entropy(&self) -> bool {
        self.entropy_used_bits >= 256
    }
}

/// One entry in a deck's shuffle history, appended on every `shuffle` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleRecord {
    pub game_id: String,
    pub proof: ShuffleProof,
}
