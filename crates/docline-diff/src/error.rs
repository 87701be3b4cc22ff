//! Error types for the diff crate.

use docline_types::{Path, TypeError};

/// Errors that can occur during diff operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// Identity extraction failed (duplicate or missing `id`).
    #[error(transparent)]
    Identity(#[from] TypeError),

    /// A changed location could not be found in the original document.
    #[error("path not found: '{0}'")]
    PathNotFound(Path),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
