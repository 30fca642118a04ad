//! Seekable reader for stored ZIP entries
//!
//! [`ZipEntryChunkReader`] implements parquet's [`ChunkReader`] over the byte
//! range of one archive entry, so a table inside an archive is read in place:
//! selective reads fetch the footer and the chosen row groups only.
//!
//! The entry must be `Stored` (no compression). Table streams are already
//! compressed by Parquet, and only stored entries can be seeked into.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use parquet::errors::ParquetError;
use parquet::file::reader::{ChunkReader, Length};
use zip::{CompressionMethod, ZipArchive};

use super::ReaderError;

/// Reader for the byte range of a stored ZIP entry
///
/// Every read opens its own file handle, so the reader can be shared across
/// threads without locking.
#[derive(Debug)]
pub struct ZipEntryChunkReader {
    zip_path: PathBuf,
    entry_name: String,
    entry_offset: u64,
    entry_size: u64,
}

impl ZipEntryChunkReader {
    /// Locate a stored entry inside an archive on disk.
    ///
    /// # Errors
    /// Returns an error if the entry is missing or compressed, or on I/O
    /// failure.
    ///
    /// # Example
    /// ```rust,no_run
    /// use morphpack::reader::zip_chunk_reader::ZipEntryChunkReader;
    ///
    /// let reader = ZipEntryChunkReader::new("collection.zip", "neurons.parquet")?;
    /// println!("{} bytes", reader.entry_size());
    /// # Ok::<(), morphpack::reader::ReaderError>(())
    /// ```
    pub fn new<P: AsRef<Path>>(zip_path: P, entry_name: &str) -> Result<Self, ReaderError> {
        let zip_path = zip_path.as_ref();
        let file = File::open(zip_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;

        let entry = archive
            .by_name(entry_name)
            .map_err(|_| ReaderError::TableNotFound(entry_name.to_string()))?;

        if entry.compression() != CompressionMethod::Stored {
            return Err(ReaderError::InvalidFormat(format!(
                "archive entry '{}' must be Stored (uncompressed) for in-place reads, found {:?}",
                entry_name,
                entry.compression()
            )));
        }

        Ok(Self {
            zip_path: zip_path.to_path_buf(),
            entry_name: entry_name.to_string(),
            entry_offset: entry.data_start(),
            entry_size: entry.size(),
        })
    }

    /// Name of the entry inside the archive
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }

    /// Returns the size of the entry in bytes
    pub fn entry_size(&self) -> u64 {
        self.entry_size
    }

    /// Returns the byte offset of the entry within the ZIP file
    pub fn entry_offset(&self) -> u64 {
        self.entry_offset
    }

    fn open_at(&self, start: u64) -> Result<File, ParquetError> {
        if start > self.entry_size {
            return Err(ParquetError::EOF(format!(
                "offset {} beyond entry of {} bytes",
                start, self.entry_size
            )));
        }
        let mut file = File::open(&self.zip_path)
            .map_err(|e| ParquetError::General(format!("Failed to open archive: {}", e)))?;
        file.seek(SeekFrom::Start(self.entry_offset + start))
            .map_err(|e| ParquetError::General(format!("Failed to seek in archive: {}", e)))?;
        Ok(file)
    }
}

impl Length for ZipEntryChunkReader {
    fn len(&self) -> u64 {
        self.entry_size
    }
}

/// File handle limited to the remainder of one entry
pub struct ZipEntrySliceReader {
    file: File,
    remaining: u64,
}

impl Read for ZipEntrySliceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let to_read = std::cmp::min(buf.len() as u64, self.remaining) as usize;
        let n = self.file.read(&mut buf[..to_read])?;
        self.remaining -= n as u64;
        Ok(n)
    }
}

impl ChunkReader for ZipEntryChunkReader {
    type T = ZipEntrySliceReader;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        Ok(ZipEntrySliceReader {
            file: self.open_at(start)?,
            remaining: self.entry_size - start,
        })
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        let mut file = self.open_at(start)?;
        let available = (self.entry_size - start) as usize;
        let mut buf = vec![0u8; std::cmp::min(length, available)];
        file.read_exact(&mut buf)
            .map_err(|e| ParquetError::General(format!("Failed to read from archive: {}", e)))?;
        Ok(Bytes::from(buf))
    }
}

/// Arc-wrapped [`ZipEntryChunkReader`], cheap to clone into several readers
#[derive(Debug, Clone)]
pub struct SharedZipEntryReader(pub Arc<ZipEntryChunkReader>);

impl SharedZipEntryReader {
    /// Create a new shared reader from a ZipEntryChunkReader
    pub fn new(reader: ZipEntryChunkReader) -> Self {
        Self(Arc::new(reader))
    }

    /// Get a reference to the inner reader
    pub fn inner(&self) -> &ZipEntryChunkReader {
        &self.0
    }
}

impl Length for SharedZipEntryReader {
    fn len(&self) -> u64 {
        self.0.entry_size
    }
}

impl ChunkReader for SharedZipEntryReader {
    type T = ZipEntrySliceReader;

    fn get_read(&self, start: u64) -> parquet::errors::Result<Self::T> {
        self.0.get_read(start)
    }

    fn get_bytes(&self, start: u64, length: usize) -> parquet::errors::Result<Bytes> {
        self.0.get_bytes(start, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const PAYLOAD: &[u8] = b"PAR1neuron_rows_go_here_0123PAR1";

    fn archive_with(compression: CompressionMethod) -> NamedTempFile {
        let temp = NamedTempFile::new().expect("temp file");
        let mut zip = ZipWriter::new(temp.reopen().expect("reopen"));
        let options = SimpleFileOptions::default().compression_method(compression);
        zip.start_file("readme.txt", options).expect("start");
        zip.write_all(b"not a table").expect("write");
        zip.start_file("neurons.parquet", options).expect("start");
        zip.write_all(PAYLOAD).expect("write");
        zip.finish().expect("finish");
        temp
    }

    #[test]
    fn test_stored_entry_opens() {
        let temp = archive_with(CompressionMethod::Stored);
        let reader = ZipEntryChunkReader::new(temp.path(), "neurons.parquet").expect("should open");
        assert_eq!(reader.entry_size(), PAYLOAD.len() as u64);
        assert_eq!(reader.entry_name(), "neurons.parquet");
        assert!(reader.entry_offset() > 0);
        assert_eq!(Length::len(&reader), PAYLOAD.len() as u64);
    }

    #[test]
    fn test_compressed_entry_rejected() {
        let temp = archive_with(CompressionMethod::Deflated);
        let err = ZipEntryChunkReader::new(temp.path(), "neurons.parquet").expect_err("compressed");
        assert!(err.to_string().contains("Stored"));
    }

    #[test]
    fn test_missing_entry() {
        let temp = archive_with(CompressionMethod::Stored);
        let err = ZipEntryChunkReader::new(temp.path(), "synapses.parquet").expect_err("missing");
        assert!(matches!(err, ReaderError::TableNotFound(name) if name == "synapses.parquet"));
    }

    #[test]
    fn test_get_bytes_within_entry() {
        let temp = archive_with(CompressionMethod::Stored);
        let reader = ZipEntryChunkReader::new(temp.path(), "neurons.parquet").expect("open");

        assert_eq!(&reader.get_bytes(0, 4).expect("read")[..], b"PAR1");
        assert_eq!(&reader.get_bytes(4, 6).expect("read")[..], b"neuron");
        let tail = PAYLOAD.len() as u64 - 4;
        assert_eq!(&reader.get_bytes(tail, 4).expect("read")[..], b"PAR1");
        // Reads are clamped to the entry
        assert_eq!(reader.get_bytes(tail, 100).expect("read").len(), 4);
    }

    #[test]
    fn test_get_read_stops_at_entry_end() {
        let temp = archive_with(CompressionMethod::Stored);
        let reader = SharedZipEntryReader::new(
            ZipEntryChunkReader::new(temp.path(), "neurons.parquet").expect("open"),
        );
        let mut out = Vec::new();
        reader.get_read(0).expect("reader").read_to_end(&mut out).expect("read");
        assert_eq!(out, PAYLOAD);
        assert!(reader.get_read(PAYLOAD.len() as u64 + 1).is_err());
    }
}
