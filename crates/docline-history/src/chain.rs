use docline_diff::{compute_diff, DiffOptions};
use docline_patch::apply_change_sequence;
use docline_types::{Change, DiffRecord, Value};
use tracing::debug;

use crate::error::{HistoryError, HistoryResult};

/// A reconstructed document at one version.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    /// Number of diff records folded into the base.
    pub applied: usize,
    pub document: Value,
}

/// A base document and the records that follow it, in ascending version
/// order.
#[derive(Clone, Copy, Debug)]
pub struct VersionChain<'a> {
    base: &'a Value,
    base_version: u64,
    records: &'a [DiffRecord],
}

impl<'a> VersionChain<'a> {
    /// Build a chain, checking that record versions follow `base_version`
    /// one by one with no gaps.
    pub fn new(
        base: &'a Value,
        base_version: u64,
        records: &'a [DiffRecord],
    ) -> HistoryResult<Self> {
        let mut previous = base_version;
        for record in records {
            if record.version <= previous {
                return Err(HistoryError::NonMonotonicVersion {
                    previous,
                    next: record.version,
                });
            }
            if record.version != previous + 1 {
                return Err(HistoryError::VersionGap {
                    missing: previous + 1,
                    next: record.version,
                });
            }
            previous = record.version;
        }
        Ok(Self {
            base,
            base_version,
            records,
        })
    }

    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn head_version(&self) -> u64 {
        self.records
            .last()
            .map_or(self.base_version, |record| record.version)
    }

    /// Every version the chain can reconstruct, base first.
    pub fn versions(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(self.base_version).chain(self.records.iter().map(|r| r.version))
    }

    /// Reconstruct the document at `version`.
    pub fn snapshot(&self, version: u64) -> HistoryResult<Snapshot> {
        let applied = if version == self.base_version {
            0
        } else {
            self.records
                .iter()
                .position(|record| record.version == version)
                .map(|index| index + 1)
                .ok_or(HistoryError::VersionNotFound {
                    version,
                    base: self.base_version,
                    head: self.head_version(),
                })?
        };

        let mut document = self.base.clone();
        for record in &self.records[..applied] {
            document = apply_change_sequence(&record.changes, &document).map_err(|source| {
                HistoryError::Replay {
                    version: record.version,
                    source,
                }
            })?;
        }

        debug!(version, applied, "reconstructed snapshot");
        Ok(Snapshot {
            version,
            applied,
            document,
        })
    }

    /// Reconstruct the latest version.
    pub fn head(&self) -> HistoryResult<Snapshot> {
        self.snapshot(self.head_version())
    }

    /// The changes that turn version `from` into version `to`.
    ///
    /// Both endpoints are reconstructed independently and diffed afresh.
    /// `from` may be later than `to`.
    pub fn compare(&self, from: u64, to: u64, options: &DiffOptions) -> HistoryResult<Vec<Change>> {
        let from_snapshot = self.snapshot(from)?;
        let to_snapshot = self.snapshot(to)?;
        let changes = compute_diff(&from_snapshot.document, &to_snapshot.document, options)?;
        debug!(from, to, changes = changes.len(), "compared versions");
        Ok(changes)
    }
}

/// Fold `base` through every record, in order. The base is version 0.
pub fn reconstruct(base: &Value, records: &[DiffRecord]) -> HistoryResult<Value> {
    Ok(VersionChain::new(base, 0, records)?.head()?.document)
}

/// Diff the snapshots at `from` and `to`. The base is version 0.
pub fn compare_versions(
    base: &Value,
    records: &[DiffRecord],
    from: u64,
    to: u64,
    options: &DiffOptions,
) -> HistoryResult<Vec<Change>> {
    VersionChain::new(base, 0, records)?.compare(from, to, options)
}
