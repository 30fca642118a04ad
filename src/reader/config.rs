use std::path::PathBuf;

use bytes::Bytes;

use super::zip_chunk_reader::SharedZipEntryReader;

/// Configuration for reading neuron containers
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Batch size for reading records
    pub batch_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { batch_size: 65536 }
    }
}

/// Where the bytes of one Parquet table live
#[derive(Debug, Clone)]
pub(crate) enum TableSource {
    /// Bare Parquet file on disk
    File(PathBuf),
    /// Stored entry of a ZIP archive on disk
    ZipEntry(SharedZipEntryReader),
    /// In-memory Parquet bytes
    Memory(Bytes),
}

/// Where the container itself lives
#[derive(Debug, Clone)]
pub(crate) enum ContainerLocation {
    /// File on disk
    File(PathBuf),
    /// In-memory buffer
    Memory(Bytes),
}
