use thiserror::Error;

/// Errors emitted by the core data model.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("column '{column}' has {found} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("invalid column partition: {0}")]
    InvalidPartition(String),
    #[error("invalid row split: {0}")]
    InvalidSplit(String),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, CoreError>;
