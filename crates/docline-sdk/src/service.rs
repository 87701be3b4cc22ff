use std::sync::Arc;

use docline_diff::{compute_diff, DiffOptions};
use docline_history::VersionChain;
use docline_store::{
    BroadcastSink, ChangeNotification, DiffRecordStore, DocumentStore, InMemoryDiffRecordStore,
    InMemoryDocumentStore, NoOpSink, NotificationSink, StoreError, VersionedDocument,
};
use docline_types::{Change, DiffRecord, DocumentId, Value};
use tracing::{debug, info, warn};

use crate::config::DoclineConfig;
use crate::error::{SdkError, SdkResult};

/// Result of an update attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateOutcome {
    /// The document version after the update.
    pub version: u64,
    /// The recorded changes. Empty when nothing outside excluded fields
    /// changed.
    pub changes: Vec<Change>,
}

impl UpdateOutcome {
    /// Whether the update produced no tracked changes.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Versioned document updates backed by pluggable collaborators.
///
/// Every version is recorded as the diff from its predecessor, starting with
/// a diff from `{}` at version 1. History queries replay those records, so a
/// reconstructed version is the stored document with excluded fields
/// removed.
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    records: Arc<dyn DiffRecordStore>,
    sink: Arc<dyn NotificationSink>,
    options: DiffOptions,
    max_retries: u32,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        records: Arc<dyn DiffRecordStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            documents,
            records,
            sink,
            options: DiffOptions::default(),
            max_retries: DoclineConfig::default().max_retries,
        }
    }

    /// A service over in-memory stores that discards notifications.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryDiffRecordStore::new()),
            Arc::new(NoOpSink),
        )
    }

    /// An in-memory service configured for `type_name`, publishing to a
    /// broadcast sink sized from the config.
    pub fn from_config(
        config: &DoclineConfig,
        type_name: &str,
    ) -> SdkResult<(Self, Arc<BroadcastSink>)> {
        let sink = Arc::new(BroadcastSink::new(config.notification_capacity));
        let service = Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryDiffRecordStore::new()),
            sink.clone(),
        )
        .with_options(config.diff_options(type_name)?)
        .with_max_retries(config.max_retries);
        Ok((service, sink))
    }

    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    // ---- Writes ----

    /// Store `value` as version 1 of a new document.
    pub fn create(&self, value: Value) -> SdkResult<VersionedDocument> {
        let id = DocumentId::new();
        let changes = compute_diff(&empty_document(), &value, &self.options)?;
        let document = self.documents.create(id, value)?;
        self.records.append(&id, document.version, changes.clone())?;
        self.notify(id, document.version, changes);
        info!(document = %id.short_id(), "created document");
        Ok(document)
    }

    /// Replace the document with `value`.
    pub fn update(&self, id: &DocumentId, value: Value) -> SdkResult<UpdateOutcome> {
        self.update_with(id, |_| value.clone())
    }

    /// Apply `edit` to the current document and store the result.
    ///
    /// On a save conflict the document is reloaded and `edit` runs again, up
    /// to `max_retries` extra times. An edit that returns the document
    /// unchanged stores nothing and reports the current version. An edit that
    /// only touches excluded fields is saved with an empty diff record and no
    /// notification.
    pub fn update_with<F>(&self, id: &DocumentId, mut edit: F) -> SdkResult<UpdateOutcome>
    where
        F: FnMut(&Value) -> Value,
    {
        let attempts = self.max_retries.saturating_add(1);
        for attempt in 1..=attempts {
            let current = self.documents.load(id)?;
            let next = edit(&current.value);
            if next == current.value {
                debug!(document = %id.short_id(), version = current.version, "update is a no-op");
                return Ok(UpdateOutcome {
                    version: current.version,
                    changes: Vec::new(),
                });
            }
            let changes = compute_diff(&current.value, &next, &self.options)?;

            let version = match self.documents.save(id, next, current.version) {
                Ok(version) => version,
                Err(StoreError::Conflict {
                    expected, actual, ..
                }) => {
                    warn!(
                        document = %id.short_id(),
                        attempt,
                        expected,
                        actual,
                        "save conflict, retrying"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            self.records.append(id, version, changes.clone())?;
            if !changes.is_empty() {
                self.notify(*id, version, changes.clone());
            }
            debug!(document = %id.short_id(), version, changes = changes.len(), "updated document");
            return Ok(UpdateOutcome { version, changes });
        }

        Err(SdkError::RetriesExhausted { id: *id, attempts })
    }

    /// Publish after the document and its record are stored. A sink failure
    /// cannot undo the save, so it is logged rather than returned.
    fn notify(&self, id: DocumentId, version: u64, changes: Vec<Change>) {
        let notification = ChangeNotification {
            document: id,
            version,
            changes,
        };
        if let Err(err) = self.sink.publish(notification) {
            warn!(document = %id.short_id(), version, error = %err, "change notification failed");
        }
    }

    // ---- Reads ----

    pub fn load(&self, id: &DocumentId) -> SdkResult<VersionedDocument> {
        Ok(self.documents.load(id)?)
    }

    /// Every recorded diff of the document, ascending.
    pub fn history(&self, id: &DocumentId) -> SdkResult<Vec<DiffRecord>> {
        self.ensure_exists(id)?;
        Ok(self.records.load_all(id)?)
    }

    /// Reconstruct the document at `version`. Version 0 is `{}`.
    pub fn snapshot(&self, id: &DocumentId, version: u64) -> SdkResult<Value> {
        self.ensure_exists(id)?;
        let records = self.records.load_range(id, 0, version)?;
        let base = empty_document();
        let chain = VersionChain::new(&base, 0, &records)?;
        Ok(chain.snapshot(version)?.document)
    }

    /// The changes that turn version `from` into version `to`.
    pub fn compare(&self, id: &DocumentId, from: u64, to: u64) -> SdkResult<Vec<Change>> {
        self.ensure_exists(id)?;
        let records = self.records.load_range(id, 0, from.max(to))?;
        let base = empty_document();
        let chain = VersionChain::new(&base, 0, &records)?;
        Ok(chain.compare(from, to, &self.options)?)
    }

    fn ensure_exists(&self, id: &DocumentId) -> SdkResult<()> {
        if self.documents.exists(id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(*id).into())
        }
    }
}

fn empty_document() -> Value {
    Value::Object(Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docline_history::HistoryError;
    use docline_types::{ExclusionSet, Op, Path};
    use serde_json::json;
    use std::cell::Cell;

    fn alice() -> Value {
        json!({
            "id": "1", "name": "Alice",
            "toys": [{"id": "toy1", "name": "Car"}, {"id": "toy2", "name": "Doll"}],
        })
    }

    #[test]
    fn create_records_version_one() {
        let service = DocumentService::in_memory();
        let doc = service.create(alice()).unwrap();
        assert_eq!(doc.version, 1);

        let history = service.history(&doc.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].version, 1);
        assert_eq!(service.snapshot(&doc.id, 1).unwrap(), alice());
        assert_eq!(service.snapshot(&doc.id, 0).unwrap(), json!({}));
    }

    #[test]
    fn update_records_identity_changes() {
        let service = DocumentService::in_memory();
        let doc = service.create(alice()).unwrap();

        let outcome = service
            .update(
                &doc.id,
                json!({"id": "1", "name": "Alice", "toys": [{"id": "toy2", "name": "Robot"}]}),
            )
            .unwrap();

        assert_eq!(outcome.version, 2);
        assert_eq!(
            outcome.changes,
            vec![
                Change::remove(Path::parse("/toys/toy1").unwrap(), vec!["toy1".into()]),
                Change::replace(
                    Path::parse("/toys/toy2/name").unwrap(),
                    json!("Robot"),
                    vec!["toy2".into()],
                ),
            ]
        );
        assert_eq!(service.load(&doc.id).unwrap().version, 2);
    }

    #[test]
    fn identical_update_stores_nothing() {
        let service = DocumentService::in_memory();
        let doc = service.create(alice()).unwrap();

        let outcome = service.update(&doc.id, alice()).unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.version, 1);
        assert_eq!(service.history(&doc.id).unwrap().len(), 1);
    }

    #[test]
    fn reorder_is_stored_without_changes() {
        let service = DocumentService::in_memory();
        let doc = service.create(alice()).unwrap();

        let mut reordered = alice();
        reordered["toys"].as_array_mut().unwrap().reverse();
        let outcome = service.update(&doc.id, reordered.clone()).unwrap();

        assert!(outcome.is_noop());
        assert_eq!(outcome.version, 2);
        assert_eq!(service.load(&doc.id).unwrap().value, reordered);
        assert!(service.history(&doc.id).unwrap()[1].is_empty());
    }

    #[test]
    fn conflicting_save_is_retried() {
        let service = DocumentService::in_memory();
        let doc = service.create(json!({"n": 0, "m": 0})).unwrap();
        let interfered = Cell::new(false);

        let outcome = service
            .update_with(&doc.id, |current| {
                if !interfered.replace(true) {
                    service.update(&doc.id, json!({"n": 1, "m": 0})).unwrap();
                }
                let mut next = current.clone();
                next["m"] = json!(9);
                next
            })
            .unwrap();

        assert_eq!(outcome.version, 3);
        assert_eq!(service.load(&doc.id).unwrap().value, json!({"n": 1, "m": 9}));
        assert_eq!(service.snapshot(&doc.id, 2).unwrap(), json!({"n": 1, "m": 0}));
    }

    #[test]
    fn persistent_conflicts_exhaust_retries() {
        let service = DocumentService::in_memory().with_max_retries(2);
        let doc = service.create(json!({"n": 0})).unwrap();
        let counter = Cell::new(0);

        let err = service
            .update_with(&doc.id, |current| {
                counter.set(counter.get() + 1);
                service.update(&doc.id, json!({"n": counter.get()})).unwrap();
                let mut next = current.clone();
                next["other"] = json!(true);
                next
            })
            .unwrap_err();

        assert!(matches!(err, SdkError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn compare_nets_out_intermediate_versions() {
        let service = DocumentService::in_memory();
        let doc = service.create(json!({"toys": []})).unwrap();
        service
            .update(&doc.id, json!({"toys": [{"id": "x", "name": "Kite"}]}))
            .unwrap();
        service.update(&doc.id, json!({"toys": []})).unwrap();
        service
            .update(&doc.id, json!({"toys": [{"id": "x", "name": "Kite"}]}))
            .unwrap();

        assert!(service.compare(&doc.id, 2, 4).unwrap().is_empty());
        let net = service.compare(&doc.id, 1, 4).unwrap();
        assert_eq!(net.len(), 1);
        assert_eq!(net[0].op, Op::Add);
    }

    #[test]
    fn snapshot_beyond_head_fails() {
        let service = DocumentService::in_memory();
        let doc = service.create(json!({"a": 1})).unwrap();
        let err = service.snapshot(&doc.id, 9).unwrap_err();
        assert!(matches!(
            err,
            SdkError::History(HistoryError::VersionNotFound { version: 9, .. })
        ));
    }

    #[test]
    fn unknown_document_is_not_found() {
        let service = DocumentService::in_memory();
        let err = service.update(&DocumentId::new(), json!({})).unwrap_err();
        assert!(matches!(err, SdkError::Store(StoreError::NotFound(_))));
        assert!(matches!(
            service.history(&DocumentId::new()).unwrap_err(),
            SdkError::Store(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn excluded_fields_do_not_trigger_updates() {
        let service = DocumentService::in_memory().with_options(
            DiffOptions::new().with_exclusions(ExclusionSet::from_paths(["updatedAt"]).unwrap()),
        );
        let doc = service.create(json!({"name": "A", "updatedAt": 1})).unwrap();
        let outcome = service
            .update(&doc.id, json!({"name": "A", "updatedAt": 2}))
            .unwrap();
        assert!(outcome.is_noop());
        assert_eq!(outcome.version, 2);

        let stored = service.load(&doc.id).unwrap();
        assert_eq!(stored.value, json!({"name": "A", "updatedAt": 2}));
        assert_eq!(stored.version, 2);
        assert_eq!(service.history(&doc.id).unwrap().len(), 2);
        assert_eq!(service.snapshot(&doc.id, 2).unwrap(), json!({"name": "A"}));
    }

    fn shared_stores() -> (Arc<InMemoryDocumentStore>, Arc<InMemoryDiffRecordStore>) {
        (
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryDiffRecordStore::new()),
        )
    }

    #[test]
    fn history_with_a_pending_record_is_not_replayed() {
        let (documents, records) = shared_stores();
        let service = DocumentService::new(documents.clone(), records.clone(), Arc::new(NoOpSink));
        let doc = service.create(json!({"toys": []})).unwrap();

        // Another writer has saved version 2 but not yet recorded its diff.
        let second = json!({"toys": [{"id": "k", "name": "Kite"}]});
        documents.save(&doc.id, second.clone(), 1).unwrap();
        let third = json!({"toys": [{"id": "k", "name": "Kayak"}]});
        assert_eq!(service.update(&doc.id, third.clone()).unwrap().version, 3);

        assert!(matches!(
            service.snapshot(&doc.id, 3).unwrap_err(),
            SdkError::History(HistoryError::VersionGap { missing: 2, next: 3 })
        ));

        let late = compute_diff(&json!({"toys": []}), &second, &DiffOptions::default()).unwrap();
        records.append(&doc.id, 2, late).unwrap();
        assert_eq!(service.snapshot(&doc.id, 2).unwrap(), second);
        assert_eq!(service.snapshot(&doc.id, 3).unwrap(), third);
    }

    struct FailingSink;

    impl NotificationSink for FailingSink {
        fn publish(&self, _notification: ChangeNotification) -> Result<(), StoreError> {
            Err(StoreError::Notification("subscriber gone".into()))
        }
    }

    #[test]
    fn sink_failure_does_not_fail_a_stored_update() {
        let (documents, records) = shared_stores();
        let service = DocumentService::new(documents, records, Arc::new(FailingSink));
        let doc = service.create(json!({"n": 1})).unwrap();
        let outcome = service.update(&doc.id, json!({"n": 2})).unwrap();
        assert_eq!(outcome.version, 2);
        assert_eq!(service.history(&doc.id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_every_version() {
        let config = DoclineConfig::default();
        let (service, sink) = DocumentService::from_config(&config, "person").unwrap();
        let mut stream = sink.subscribe();

        let doc = service.create(json!({"n": 1})).unwrap();
        service.update(&doc.id, json!({"n": 2})).unwrap();

        let first = stream.recv().await.unwrap();
        let second = stream.recv().await.unwrap();
        assert_eq!((first.document, first.version), (doc.id, 1));
        assert_eq!((second.document, second.version), (doc.id, 2));
        assert_eq!(second.changes[0].value, Some(json!(2)));
    }
}
