use docline_diff::DiffError;
use docline_patch::PatchError;

/// Errors produced by version chain operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("replaying version {version} failed: {source}")]
    Replay {
        version: u64,
        #[source]
        source: PatchError,
    },

    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("versions must ascend: {next} follows {previous}")]
    NonMonotonicVersion { previous: u64, next: u64 },

    /// A version between two records is missing, so later diffs cannot be
    /// replayed.
    #[error("version {missing} missing from chain before {next}")]
    VersionGap { missing: u64, next: u64 },

    #[error("version {version} not in chain (base {base}, head {head})")]
    VersionNotFound { version: u64, base: u64, head: u64 },
}

pub type HistoryResult<T> = Result<T, HistoryError>;
