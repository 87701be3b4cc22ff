//! Error types for the patch crate.

use docline_types::{Op, Path, ValueKind};

/// Errors that can occur while applying a change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// A non-terminal segment, or the target of a non-`add` op, is absent.
    #[error("path not found: '{path}' (at segment {segment:?})")]
    PathNotFound { path: Path, segment: String },

    /// No sibling in the target carries the identity token.
    #[error("no element with id {id:?} at '{path}'")]
    IdentityNotFound { path: Path, id: String },

    /// A node has the wrong kind for the op (e.g. `replace` on an array slot).
    #[error("cannot {op} at '{path}': found {found}")]
    TypeMismatch { op: Op, path: Path, found: ValueKind },

    /// An `add` or `replace` without a value.
    #[error("{op} at '{path}' carries no value")]
    MissingValue { op: Op, path: Path },

    /// An op outside add/remove/replace.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An encoded change that could not be decoded.
    #[error("invalid change at index {index}: {reason}")]
    InvalidChange { index: usize, reason: String },
}

/// Convenience alias for patch results.
pub type PatchResult<T> = Result<T, PatchError>;
