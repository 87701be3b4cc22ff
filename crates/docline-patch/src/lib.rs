//! Patch applier for docline.
//!
//! Applies [`Change`](docline_types::Change) records to a concrete document.
//! Array elements addressed by identity are located by their `id` in the
//! target itself, so a change sequence computed against one instance of a
//! document can be replayed against another instance whose identifiable
//! arrays are ordered differently.
//!
//! Application is pure: the target is never modified and a new document is
//! returned. A failing change aborts the whole call with no partial result.

pub mod apply;
pub mod error;
pub mod wire;

pub use apply::{apply_change, apply_change_sequence};
pub use error::{PatchError, PatchResult};
pub use wire::{decode_changes, encode_changes};
