use std::collections::HashSet;
use std::io::{Read, Seek, Write};

use log::debug;
use parquet::arrow::ArrowWriter;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::schema::ZIP_COMMENT_PRIMARY_PREFIX;
use crate::writer::{secondary_footer, WriterConfig};

use super::{ArchiveError, SecondaryTable};

const STREAM_COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Copy data from a reader to a ZIP writer with bounded memory.
fn stream_copy_to_zip<R: Read, W: Write + Seek>(mut reader: R, zip_writer: &mut ZipWriter<W>) -> std::io::Result<u64> {
    let mut buffer = [0u8; STREAM_COPY_BUFFER_SIZE];
    let mut total_written = 0u64;

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        zip_writer.write_all(&buffer[..bytes_read])?;
        total_written += bytes_read as u64;
    }

    Ok(total_written)
}

/// Bundles a primary table and secondary tables into one ZIP archive.
///
/// Every table is a complete Parquet file stored uncompressed, so each
/// entry can be opened on its own and read in place. The primary entry is
/// named in the archive comment.
pub struct ArchiveComposer<W: Write + Seek> {
    zip: ZipWriter<W>,
    primary: Option<String>,
    entries: HashSet<String>,
}

impl<W: Write + Seek> ArchiveComposer<W> {
    /// Start an archive on `sink`
    pub fn new(sink: W) -> Self {
        Self {
            zip: ZipWriter::new(sink),
            primary: None,
            entries: HashSet::new(),
        }
    }

    fn options() -> SimpleFileOptions {
        // Parquet streams MUST be Stored for seekability
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .unix_permissions(0o644)
    }

    fn add_entry<R: Read>(&mut self, entry: &str, reader: R) -> Result<u64, ArchiveError> {
        if !self.entries.insert(entry.to_string()) {
            return Err(ArchiveError::DuplicateTable(entry.to_string()));
        }
        self.zip.start_file(entry, Self::options())?;
        let written = stream_copy_to_zip(reader, &mut self.zip)?;
        debug!("Added archive entry {} ({} bytes)", entry, written);
        Ok(written)
    }

    /// Add the primary table stream
    pub fn add_primary<R: Read>(&mut self, entry: &str, reader: R) -> Result<u64, ArchiveError> {
        if self.primary.is_some() {
            return Err(ArchiveError::DuplicateTable(entry.to_string()));
        }
        let written = self.add_entry(entry, reader)?;
        self.primary = Some(entry.to_string());
        Ok(written)
    }

    /// Add a secondary table stream
    pub fn add_secondary<R: Read>(&mut self, entry: &str, reader: R) -> Result<u64, ArchiveError> {
        self.add_entry(entry, reader)
    }

    /// Encode a secondary table as Parquet and add it
    pub fn add_secondary_table(&mut self, table: &SecondaryTable, config: &WriterConfig) -> Result<u64, ArchiveError> {
        let buffer = write_secondary_table(Vec::new(), table, config)?;
        self.add_secondary(&table.entry_name(), buffer.as_slice())
    }

    /// Write the central directory and return the sink
    pub fn finish(mut self) -> Result<W, ArchiveError> {
        let primary = self.primary.take().ok_or(ArchiveError::MissingPrimary)?;
        self.zip
            .set_comment(format!("{}{}", ZIP_COMMENT_PRIMARY_PREFIX, primary));
        Ok(self.zip.finish()?)
    }
}

/// Encode a secondary table as a self-describing Parquet file.
pub fn write_secondary_table<W: Write + Send>(
    sink: W,
    table: &SecondaryTable,
    config: &WriterConfig,
) -> Result<W, ArchiveError> {
    table.validate_name()?;
    let id_type = table.id_type()?;
    let footer = secondary_footer(table.name(), table.id_column(), id_type);
    let props = config.to_writer_properties(&table.batch().schema(), table.id_column(), &footer);

    let mut writer = ArrowWriter::try_new(sink, table.batch().schema(), Some(props))?;
    writer.write(table.batch())?;
    Ok(writer.into_inner()?)
}
