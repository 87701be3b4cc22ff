//! Foundation types for docline.
//!
//! This crate provides the document model, identity rules, and change records
//! shared by every other docline crate. Every other docline crate depends on
//! `docline-types`.
//!
//! # Key Types
//!
//! - [`ValueKind`] -- Discriminant of a document value (documents are `serde_json::Value`)
//! - [`IdentityMode`] -- Whether an array is addressed by element `id` or by position
//! - [`Path`] -- Slash-separated logical path of field names, identity tokens, and indices
//! - [`Change`] / [`Op`] -- One recorded mutation in the wire format
//! - [`ExclusionSet`] -- Field paths never compared or emitted
//! - [`DocumentId`] -- UUID v7 identifier used by the persistence collaborators
//! - [`DiffRecord`] -- The changes recorded for one document version

pub mod change;
pub mod document;
pub mod error;
pub mod exclusion;
pub mod identity;
pub mod path;
pub mod record;
pub mod value;

pub use change::{Change, Op};
pub use document::DocumentId;
pub use error::TypeError;
pub use exclusion::{ExclusionCursor, ExclusionSet};
pub use identity::{extract_identity, IdentityMode, IdentityPolicy, IDENTITY_FIELD};
pub use path::{Path, APPEND_MARKER};
pub use record::DiffRecord;
pub use value::ValueKind;

/// Document value. Objects are unordered maps, arrays are ordered sequences.
pub type Value = serde_json::Value;
