/// Errors that can occur while composing or inspecting secondary tables
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Two tables share a name
    #[error("duplicate table name '{0}'")]
    DuplicateTable(String),

    /// Table name cannot be used as an archive entry
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    /// Archive finished without a primary table
    #[error("archive has no primary table")]
    MissingPrimary,

    /// Foreign-key column absent from a secondary table
    #[error("table '{table}' has no id column '{column}'")]
    MissingIdColumn {
        /// Table name
        table: String,
        /// Expected column
        column: String,
    },

    /// Foreign-key column cannot hold record ids
    #[error("id column '{column}' of table '{table}' has unsupported type {found:?}")]
    IdColumnType {
        /// Table name
        table: String,
        /// Column name
        column: String,
        /// Actual type
        found: arrow::datatypes::DataType,
    },

    /// Table contents are not usable
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
