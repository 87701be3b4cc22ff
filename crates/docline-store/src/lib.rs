//! Persistence contracts for docline.
//!
//! The diff engine never performs I/O. The layer that invokes it talks to
//! three collaborators, defined here as traits:
//!
//! - [`DocumentStore`] -- current document per id, with optimistic versioning
//! - [`DiffRecordStore`] -- append-only per-version change records
//! - [`NotificationSink`] -- receives the changes of every update
//!
//! # Reference Backends
//!
//! - [`InMemoryDocumentStore`] / [`InMemoryDiffRecordStore`] -- `HashMap`-based
//!   stores for tests and embedding
//! - [`BroadcastSink`] -- fan-out over a tokio broadcast channel
//! - [`NoOpSink`] -- discards notifications
//!
//! # Design Rules
//!
//! 1. At most one save succeeds per expected prior version; losers get
//!    [`StoreError::Conflict`] and must recompute their diff.
//! 2. Each version has at most one diff record, and records are read back
//!    in ascending version order.
//! 3. Values are passed by value; stores never hand out interior references.

pub mod error;
pub mod memory;
pub mod notify;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryDiffRecordStore, InMemoryDocumentStore};
pub use notify::{BroadcastSink, ChangeNotification, NoOpSink, NotificationStream};
pub use traits::{DiffRecordStore, DocumentStore, NotificationSink, VersionedDocument};
