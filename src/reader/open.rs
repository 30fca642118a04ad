use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use bytes::Bytes;
use log::debug;
use zip::{CompressionMethod, ZipArchive};

use crate::schema::{DEFAULT_PRIMARY_TABLE, PARQUET_MAGIC, TABLE_EXTENSION, ZIP_COMMENT_PRIMARY_PREFIX, ZIP_MAGIC};

use super::config::{ContainerLocation, TableSource};
use super::metadata::FileMetadata;
use super::table::ParquetTable;
use super::zip_chunk_reader::{SharedZipEntryReader, ZipEntryChunkReader};
use super::{ContainerKind, NeuronReader, ReaderConfig, ReaderError};

/// Tell a bare Parquet table from a ZIP archive by its leading bytes
pub(crate) fn detect_container(head: &[u8]) -> Result<ContainerKind, ReaderError> {
    if head.starts_with(PARQUET_MAGIC) {
        Ok(ContainerKind::Bare)
    } else if head.starts_with(ZIP_MAGIC) {
        Ok(ContainerKind::Archive)
    } else {
        Err(ReaderError::InvalidFormat(
            "not a Parquet table or ZIP archive (unrecognized magic bytes)".to_string(),
        ))
    }
}

/// Table entries of an archive: the primary entry name and the others
struct ArchiveListing {
    primary: String,
    secondary: Vec<String>,
}

impl ArchiveListing {
    fn read<R: Read + Seek>(archive: &ZipArchive<R>) -> Result<Self, ReaderError> {
        let mut tables: Vec<String> = archive
            .file_names()
            .filter(|name| name.ends_with(TABLE_EXTENSION))
            .map(str::to_string)
            .collect();
        tables.sort();

        let comment = String::from_utf8_lossy(archive.comment());
        let declared = comment
            .lines()
            .find_map(|line| line.trim().strip_prefix(ZIP_COMMENT_PRIMARY_PREFIX))
            .map(str::to_string);

        let primary = match declared {
            Some(name) if tables.contains(&name) => name,
            Some(name) => return Err(ReaderError::TableNotFound(name)),
            None => {
                let fallback = format!("{}{}", DEFAULT_PRIMARY_TABLE, TABLE_EXTENSION);
                if tables.contains(&fallback) {
                    fallback
                } else if tables.len() == 1 {
                    tables[0].clone()
                } else {
                    return Err(ReaderError::InvalidFormat(format!(
                        "archive does not name its primary table and holds {} tables",
                        tables.len()
                    )));
                }
            }
        };

        let secondary = tables.into_iter().filter(|name| *name != primary).collect();
        Ok(Self { primary, secondary })
    }
}

/// Byte range of a stored entry inside an in-memory archive
pub(crate) fn entry_slice(bytes: &Bytes, entry_name: &str) -> Result<Bytes, ReaderError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes.clone()))?;
    let entry = archive
        .by_name(entry_name)
        .map_err(|_| ReaderError::TableNotFound(entry_name.to_string()))?;
    if entry.compression() != CompressionMethod::Stored {
        return Err(ReaderError::InvalidFormat(format!(
            "archive entry '{}' must be Stored (uncompressed), found {:?}",
            entry_name,
            entry.compression()
        )));
    }
    let start = entry.data_start() as usize;
    let end = start + entry.size() as usize;
    if end > bytes.len() {
        return Err(ReaderError::InvalidFormat(format!(
            "archive entry '{}' extends past the end of the buffer",
            entry_name
        )));
    }
    Ok(bytes.slice(start..end))
}

/// Entry name for a table name, adding the extension when missing
pub(crate) fn entry_name_for(table: &str) -> String {
    if table.ends_with(TABLE_EXTENSION) {
        table.to_string()
    } else {
        format!("{}{}", table, TABLE_EXTENSION)
    }
}

impl NeuronReader {
    /// Open a container on disk
    ///
    /// The format is detected from the leading bytes, not the extension:
    /// a bare Parquet table or a ZIP archive of Parquet tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReaderError> {
        Self::open_with_config(path, ReaderConfig::default())
    }

    /// Open a container on disk with custom configuration
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ReaderConfig) -> Result<Self, ReaderError> {
        let path = path.as_ref();
        let mut head = [0u8; 4];
        let mut file = File::open(path)?;
        file.read_exact(&mut head).map_err(|_| {
            ReaderError::InvalidFormat(format!("{} is too short to be a container", path.display()))
        })?;

        match detect_container(&head)? {
            ContainerKind::Bare => {
                debug!("Opening bare table {}", path.display());
                let table = ParquetTable::open(TableSource::File(path.to_path_buf()))?;
                Self::assemble(ContainerLocation::File(path.to_path_buf()), ContainerKind::Bare, None, Vec::new(), table, config)
            }
            ContainerKind::Archive => {
                let archive = ZipArchive::new(BufReader::new(file))?;
                let listing = ArchiveListing::read(&archive)?;
                debug!(
                    "Opening archive {} (primary {}, {} secondary tables)",
                    path.display(),
                    listing.primary,
                    listing.secondary.len()
                );
                let reader = ZipEntryChunkReader::new(path, &listing.primary)?;
                let table = ParquetTable::open(TableSource::ZipEntry(SharedZipEntryReader::new(reader)))?;
                Self::assemble(
                    ContainerLocation::File(path.to_path_buf()),
                    ContainerKind::Archive,
                    Some(listing.primary),
                    listing.secondary,
                    table,
                    config,
                )
            }
        }
    }

    /// Open a container held in memory
    pub fn from_bytes(bytes: Bytes) -> Result<Self, ReaderError> {
        Self::from_bytes_with_config(bytes, ReaderConfig::default())
    }

    /// Open a container held in memory with custom configuration
    pub fn from_bytes_with_config(bytes: Bytes, config: ReaderConfig) -> Result<Self, ReaderError> {
        match detect_container(&bytes)? {
            ContainerKind::Bare => {
                let table = ParquetTable::open(TableSource::Memory(bytes.clone()))?;
                Self::assemble(ContainerLocation::Memory(bytes), ContainerKind::Bare, None, Vec::new(), table, config)
            }
            ContainerKind::Archive => {
                let archive = ZipArchive::new(Cursor::new(bytes.clone()))?;
                let listing = ArchiveListing::read(&archive)?;
                let table = ParquetTable::open(TableSource::Memory(entry_slice(&bytes, &listing.primary)?))?;
                Self::assemble(
                    ContainerLocation::Memory(bytes),
                    ContainerKind::Archive,
                    Some(listing.primary),
                    listing.secondary,
                    table,
                    config,
                )
            }
        }
    }

    fn assemble(
        location: ContainerLocation,
        container: ContainerKind,
        primary_entry: Option<String>,
        secondary_entries: Vec<String>,
        table: ParquetTable,
        config: ReaderConfig,
    ) -> Result<Self, ReaderError> {
        let file_metadata = FileMetadata::from_table(&table)?;
        Ok(Self {
            location,
            container,
            primary_entry,
            secondary_entries,
            table,
            config,
            file_metadata,
        })
    }

    /// Source for another table of the same container
    pub(super) fn table_source(&self, table: &str) -> Result<TableSource, ReaderError> {
        let entry = entry_name_for(table);
        if !self.secondary_entries.contains(&entry) {
            return Err(ReaderError::TableNotFound(table.to_string()));
        }
        match &self.location {
            ContainerLocation::File(path) => Ok(TableSource::ZipEntry(SharedZipEntryReader::new(
                ZipEntryChunkReader::new(path, &entry)?,
            ))),
            ContainerLocation::Memory(bytes) => Ok(TableSource::Memory(entry_slice(bytes, &entry)?)),
        }
    }
}
