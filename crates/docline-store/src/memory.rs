use std::collections::HashMap;
use std::sync::RwLock;

use docline_types::{Change, DiffRecord, DocumentId, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{DiffRecordStore, DocumentStore, VersionedDocument};

/// In-memory, HashMap-based document store.
///
/// Intended for tests and embedding. The version check and the write happen
/// under one write lock, so concurrent savers racing on the same expected
/// version see exactly one success.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, VersionedDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn create(&self, id: DocumentId, value: Value) -> StoreResult<VersionedDocument> {
        let mut map = self.documents.write().expect("lock poisoned");
        if map.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        let document = VersionedDocument {
            id,
            value,
            version: 1,
        };
        map.insert(id, document.clone());
        Ok(document)
    }

    fn load(&self, id: &DocumentId) -> StoreResult<VersionedDocument> {
        let map = self.documents.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn save(&self, id: &DocumentId, value: Value, expected_version: u64) -> StoreResult<u64> {
        let mut map = self.documents.write().expect("lock poisoned");
        let document = map.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        if document.version != expected_version {
            return Err(StoreError::Conflict {
                id: *id,
                expected: expected_version,
                actual: document.version,
            });
        }
        document.value = value;
        document.version += 1;
        debug!(document = %id, version = document.version, "saved document");
        Ok(document.version)
    }

    fn exists(&self, id: &DocumentId) -> StoreResult<bool> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDocumentStore")
            .field("document_count", &self.len())
            .finish()
    }
}

/// In-memory append-only diff record store.
#[derive(Default)]
pub struct InMemoryDiffRecordStore {
    records: RwLock<HashMap<DocumentId, Vec<DiffRecord>>>,
}

impl InMemoryDiffRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all documents.
    pub fn record_count(&self) -> usize {
        self.records
            .read()
            .expect("lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl DiffRecordStore for InMemoryDiffRecordStore {
    fn append(
        &self,
        id: &DocumentId,
        version: u64,
        changes: Vec<Change>,
    ) -> StoreResult<DiffRecord> {
        let mut map = self.records.write().expect("lock poisoned");
        let stream = map.entry(*id).or_default();
        // Writers append after their save, so versions may arrive out of order.
        let index = match stream.binary_search_by_key(&version, |record| record.version) {
            Ok(_) => return Err(StoreError::DuplicateVersion { id: *id, version }),
            Err(index) => index,
        };
        let record = DiffRecord::new(version, changes);
        stream.insert(index, record.clone());
        Ok(record)
    }

    fn load_range(&self, id: &DocumentId, from: u64, to: u64) -> StoreResult<Vec<DiffRecord>> {
        if from > to {
            return Err(StoreError::InvalidRange { from, to });
        }
        let map = self.records.read().expect("lock poisoned");
        Ok(map
            .get(id)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|record| (from..=to).contains(&record.version))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for InMemoryDiffRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDiffRecordStore")
            .field("record_count", &self.record_count())
            .finish()
    }
}
