use thiserror::Error;

/// Outcomes of storage operations that callers must tell apart.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("record not found")]
    RecordNotFound,

    #[error("edit conflict")]
    EditConflict,

    #[error("storage operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ModelError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ModelError::RecordNotFound => "not_found",
            ModelError::EditConflict => "edit_conflict",
            ModelError::Timeout => "timeout",
            ModelError::Database(_) => "database",
        }
    }
}

pub type ModelResult<T> = std::result::Result<T, ModelError>;
