//! # Table unpacker
//!
//! Reads neuron containers written by this crate (or any Parquet table that
//! follows the column contract) and selects records by id without
//! materializing the whole table.
//!
//! ## Features
//!
//! - **Selective reads**: Row groups whose `neuron` statistics exclude every
//!   requested id are skipped; the remaining rows are filtered exactly.
//! - **Container detection**: Bare Parquet tables and ZIP archives are told
//!   apart by their magic bytes.
//! - **In-place archive reads**: Tables inside an archive are read through the
//!   byte range of their stored entry.
//! - **Lazy secondary tables**: Reading the primary table never touches the
//!   secondary ones.
//!
//! ## Example
//!
//! ```rust,no_run
//! use morphpack::reader::NeuronReader;
//! use morphpack::record::RecordId;
//!
//! let reader = NeuronReader::open("collection.zip")?;
//! println!("{} rows of {}", reader.metadata().total_rows, reader.kind());
//!
//! let outcome = reader.read_ids(&[RecordId::Int(12345), RecordId::Int(67890)])?;
//! for record in &outcome.records {
//!     println!("{}: {} rows", record.id(), record.row_count());
//! }
//! println!("missing: {:?}", outcome.missing);
//! # Ok::<(), morphpack::reader::ReaderError>(())
//! ```

mod batches;
mod config;
mod error;
mod metadata;
mod open;
mod pruning;
mod records;
mod secondary;
mod table;
mod unpack;
mod utils;
pub mod zip_chunk_reader;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::Serialize;

pub use batches::RecordBatchIterator;
pub use config::ReaderConfig;
pub use error::ReaderError;
pub use metadata::FileMetadata;
pub use pruning::{select_row_groups, RowGroupSelection};
pub use records::ReadOutcome;
pub use zip_chunk_reader::{SharedZipEntryReader, ZipEntryChunkReader};

pub(crate) use open::detect_container;

use config::ContainerLocation;
use table::ParquetTable;

/// Physical layout of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    /// Single Parquet file holding the primary table
    Bare,
    /// ZIP archive of Parquet tables
    Archive,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Bare => f.write_str("bare"),
            ContainerKind::Archive => f.write_str("archive"),
        }
    }
}

/// Reader for neuron containers
///
/// Opening reads the footer of the primary table only. The reader holds no
/// open file handles between calls and can be shared across threads.
pub struct NeuronReader {
    location: ContainerLocation,
    container: ContainerKind,
    primary_entry: Option<String>,
    secondary_entries: Vec<String>,
    table: ParquetTable,
    config: ReaderConfig,
    file_metadata: FileMetadata,
}

impl NeuronReader {
    /// Footer metadata of the primary table
    pub fn metadata(&self) -> &FileMetadata {
        &self.file_metadata
    }

    /// Record kind of the primary table
    pub fn kind(&self) -> crate::record::NeuronKind {
        self.file_metadata.kind
    }

    /// Id type of the `neuron` column
    pub fn id_type(&self) -> crate::record::IdType {
        self.file_metadata.id_type
    }

    /// Container layout
    pub fn container_kind(&self) -> ContainerKind {
        self.container
    }

    /// Archive entry of the primary table, `None` for bare tables
    pub fn primary_entry(&self) -> Option<&str> {
        self.primary_entry.as_deref()
    }
}
