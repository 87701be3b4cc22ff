use docline_types::{Change, DiffRecord, DocumentId, Value};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::notify::ChangeNotification;

/// A document together with the version it was stored at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionedDocument {
    pub id: DocumentId,
    pub value: Value,
    pub version: u64,
}

/// Current-state store for documents.
///
/// Implementations must enforce at most one successful [`save`] per expected
/// prior version.
///
/// [`save`]: DocumentStore::save
pub trait DocumentStore: Send + Sync {
    /// Store a new document at version 1.
    fn create(&self, id: DocumentId, value: Value) -> StoreResult<VersionedDocument>;

    /// Load the current value and version.
    fn load(&self, id: &DocumentId) -> StoreResult<VersionedDocument>;

    /// Replace the document if its version is still `expected_version`.
    ///
    /// Returns the new version, or [`StoreError::Conflict`] if another writer
    /// saved first.
    ///
    /// [`StoreError::Conflict`]: crate::StoreError::Conflict
    fn save(&self, id: &DocumentId, value: Value, expected_version: u64) -> StoreResult<u64>;

    /// Check whether a document exists.
    fn exists(&self, id: &DocumentId) -> StoreResult<bool>;
}

/// Append-only store of per-version change records.
pub trait DiffRecordStore: Send + Sync {
    /// Record the changes that produced `version`. Each version is recorded
    /// at most once; records are kept in version order whatever the order of
    /// appends.
    fn append(
        &self,
        id: &DocumentId,
        version: u64,
        changes: Vec<Change>,
    ) -> StoreResult<DiffRecord>;

    /// Records with `from <= version <= to`, ascending.
    fn load_range(&self, id: &DocumentId, from: u64, to: u64) -> StoreResult<Vec<DiffRecord>>;

    /// Every record of a document, ascending.
    fn load_all(&self, id: &DocumentId) -> StoreResult<Vec<DiffRecord>> {
        self.load_range(id, 0, u64::MAX)
    }
}

/// Receives the change payload of each successful update.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: ChangeNotification) -> StoreResult<()>;
}
