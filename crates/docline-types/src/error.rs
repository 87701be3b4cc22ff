use thiserror::Error;

/// Errors produced by type-level operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("duplicate identity {id:?} among array siblings")]
    DuplicateIdentity { id: String },

    #[error("array element at index {index} has no string `id`")]
    MissingIdentity { index: usize },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },
}
