use docline_types::DocumentId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("update of {id} abandoned after {attempts} conflicting attempts")]
    RetriesExhausted { id: DocumentId, attempts: u32 },

    #[error("store error: {0}")]
    Store(#[from] docline_store::StoreError),

    #[error("diff error: {0}")]
    Diff(#[from] docline_diff::DiffError),

    #[error("patch error: {0}")]
    Patch(#[from] docline_patch::PatchError),

    #[error("history error: {0}")]
    History(#[from] docline_history::HistoryError),

    #[error("invalid configuration: {0}")]
    Type(#[from] docline_types::TypeError),

    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
