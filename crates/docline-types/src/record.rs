use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::change::Change;

/// The changes that produced one version of a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffRecord {
    pub version: u64,
    pub changes: Vec<Change>,
    #[serde(rename = "recordedAt")]
    pub recorded_at: DateTime<Utc>,
}

impl DiffRecord {
    /// A record stamped with the current time.
    pub fn new(version: u64, changes: Vec<Change>) -> Self {
        Self {
            version,
            changes,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
