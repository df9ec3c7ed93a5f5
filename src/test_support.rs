//! Test-only fixtures shared across modules: a JSON round-trip assertion,
//! plus small table/hand builders so engine and sync tests don't each
//! re-derive seat layouts from scratch.

#![cfg(test)]

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializes `value` to JSON, deserializes it back, and asserts the
/// result equals the original.
pub fn assert_round_trip_json<T>(value: &T)
where
    T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let encoded = serde_json::to_string(value).expect("serialize");
    let decoded: T = serde_json::from_str(&encoded).expect("deserialize");
    assert_eq!(value, &decoded, "value did not round-trip through JSON");
}
