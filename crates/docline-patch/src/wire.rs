//! Decoding and encoding of change sequences in the JSON wire format.

use docline_types::{Change, Op, Value};

use crate::error::{PatchError, PatchResult};

/// Decode a JSON array of wire changes.
///
/// An `op` outside add/remove/replace fails with
/// [`PatchError::UnsupportedOperation`]; any other malformed entry fails with
/// [`PatchError::InvalidChange`].
pub fn decode_changes(encoded: &Value) -> PatchResult<Vec<Change>> {
    let Value::Array(entries) = encoded else {
        return Err(PatchError::InvalidChange {
            index: 0,
            reason: "expected an array of changes".into(),
        });
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if let Some(op) = entry.get("op").and_then(Value::as_str) {
                if op.parse::<Op>().is_err() {
                    return Err(PatchError::UnsupportedOperation(op.to_string()));
                }
            }
            serde_json::from_value(entry.clone()).map_err(|e| PatchError::InvalidChange {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Encode changes as a JSON array in the wire format.
pub fn encode_changes(changes: &[Change]) -> serde_json::Result<Value> {
    serde_json::to_value(changes)
}
