//! Stable short key for a `ProofState`, used to refer to states in logs.

use crate::state::ProofState;

/// First 16 hex chars of a blake3 digest over the state's JSON encoding.
pub type StateKey = String;

pub fn state_key(s: &ProofState) -> StateKey {
    // Struct field order is fixed, so the JSON encoding is deterministic.
    let bytes = serde_json::to_vec(s).unwrap_or_default();
    let mut hex = blake3::hash(&bytes).to_hex().to_string();
    hex.truncate(16);
    hex
}
