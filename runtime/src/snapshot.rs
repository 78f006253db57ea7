//! State snapshots.
//!
//! A snapshot is the JSON encoding of a state value. The runtime treats it as
//! opaque: hosts decide where to keep it and when to restore from it.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from encoding or decoding a snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// State could not be encoded
    #[error("Failed to encode state snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// Snapshot could not be decoded into state
    #[error("Failed to decode state snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode a state value as a snapshot
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialization fails.
pub fn save_state<S: Serialize>(state: &S) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(SnapshotError::Encode)
}

/// Decode a snapshot back into state
///
/// # Errors
///
/// Returns [`SnapshotError::Decode`] if the snapshot is malformed or does not
/// match the state type.
pub fn restore_state<S: DeserializeOwned>(snapshot: &str) -> Result<S, SnapshotError> {
    serde_json::from_str(snapshot).map_err(SnapshotError::Decode)
}
