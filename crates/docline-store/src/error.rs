use docline_types::DocumentId;

/// Errors from persistence collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The requested document does not exist.
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// A document with this id already exists.
    #[error("document already exists: {0}")]
    AlreadyExists(DocumentId),

    /// The stored version moved on since the caller loaded it.
    #[error("version conflict on {id}: expected {expected}, found {actual}")]
    Conflict {
        id: DocumentId,
        expected: u64,
        actual: u64,
    },

    /// A diff record for this version already exists.
    #[error("diff record for {id} at version {version} already exists")]
    DuplicateVersion { id: DocumentId, version: u64 },

    #[error("invalid version range: from={from}, to={to}")]
    InvalidRange { from: u64, to: u64 },

    /// The notification sink could not deliver.
    #[error("notification failed: {0}")]
    Notification(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
