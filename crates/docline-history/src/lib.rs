//! Version chains for docline.
//!
//! A version chain is a base document plus the ordered [`DiffRecord`]s that
//! produced each later version. This crate provides:
//! - Deterministic reconstruction of any historical snapshot
//! - Version-to-version comparison by diffing two reconstructed snapshots
//!
//! Comparisons never concatenate the intermediate records: an element that
//! is added, removed, and re-added across versions must net out to nothing,
//! which only a fresh diff of the two endpoints guarantees.
//!
//! [`DiffRecord`]: docline_types::DiffRecord

pub mod chain;
pub mod error;

pub use chain::{compare_versions, reconstruct, Snapshot, VersionChain};
pub use error::{HistoryError, HistoryResult};
