//! High-level SDK for docline.
//!
//! [`DocumentService`] is the layer that invokes the diff engine: it loads a
//! document, computes the changes an update makes, saves under optimistic
//! concurrency, records the changes, and publishes them. Version history is
//! answered by replaying recorded changes from the empty document.

pub mod config;
pub mod error;
pub mod service;

pub use config::{DoclineConfig, TypeConfig};
pub use error::{SdkError, SdkResult};
pub use service::{DocumentService, UpdateOutcome};

// Re-export key types
pub use docline_diff::DiffOptions;
pub use docline_store::{ChangeNotification, VersionedDocument};
pub use docline_types::{Change, DiffRecord, DocumentId, IdentityPolicy, Op, Path, Value};
