use std::path::PathBuf;

use crate::archive::ArchiveError;
use crate::metadata::MetadataKeyErrors;
use crate::schema::SchemaError;

/// Errors that can occur while packing and publishing containers
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the Arrow library during array operations
    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    /// Error from the Parquet library during file writing
    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    /// Error writing the ZIP archive
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Records violate the schema rules
    #[error(transparent)]
    SchemaError(#[from] SchemaError),

    /// Record metadata cannot be encoded
    #[error("Metadata error: {0}")]
    MetadataError(#[from] MetadataKeyErrors),

    /// Secondary tables cannot be composed
    #[error("Archive error: {0}")]
    ArchiveError(#[from] ArchiveError),

    /// Invalid data provided to the writer
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Destination path is unusable
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Destination exists and overwriting was not requested
    #[error("Destination already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}
