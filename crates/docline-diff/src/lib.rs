//! Diff engine for docline.
//!
//! Computes reorder-tolerant change sets between two document states. Both
//! sides are pruned of excluded fields and normalized so that arrays whose
//! elements carry unique `id`s compare by identity instead of by position.
//! The raw changes found over the normalized trees are then re-projected onto
//! the original documents to produce [`Change`](docline_types::Change)
//! records addressed by identity tokens.
//!
//! # Key Types
//!
//! - [`compute_diff`] -- Entry point: `old, new, options -> Vec<Change>`
//! - [`DiffOptions`] -- Exclusion set and identity policy for one document type
//! - [`Normalized`] / [`normalize`] -- Order-independent view used for diffing

pub mod engine;
pub mod error;
pub mod normalize;
pub mod options;
mod raw;
mod reproject;

pub use engine::compute_diff;
pub use error::{DiffError, DiffResult};
pub use normalize::{normalize, prune, Normalized};
pub use options::DiffOptions;
