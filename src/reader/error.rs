use crate::record::RecordId;

/// Errors that can occur during reading
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Requested records matched no rows
    #[error("Record(s) not found: {}", join_ids(.0))]
    RecordNotFound(Vec<RecordId>),

    /// Table breaks the column contract or holds an invalid skeleton graph
    #[error("Corrupt table: {0}")]
    CorruptTable(String),

    /// No table stream with this name in the container
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

fn join_ids(ids: &[RecordId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
