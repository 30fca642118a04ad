use std::collections::HashSet;
use std::io::{BufReader, BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::archive::{find_dangling, ArchiveComposer, ArchiveError, DanglingReference};
use crate::metadata::MetadataKeyErrors;
use crate::reader::ContainerKind;
use crate::record::{Neuron, RecordId};
use crate::schema::{validate_records, TableLayout, TABLE_EXTENSION};
use crate::writer::{primary_footer, ContainerFormat, NeuronTableWriter, WriterConfig, WriterError, WriterStats};

use super::{NeuronCollection, PackReport};

/// A collection that passed every check and is ready to be written
struct PreparedPack<'a> {
    collection: &'a NeuronCollection,
    layout: TableLayout,
    order: Vec<&'a Neuron>,
    footer: Vec<(String, String)>,
    format: ContainerKind,
    dangling: Vec<DanglingReference>,
}

impl<'a> PreparedPack<'a> {
    /// Run every check before any bytes are written.
    fn new(collection: &'a NeuronCollection, config: &WriterConfig) -> Result<Self, WriterError> {
        let table_name = config.primary_table_name.as_str();
        if table_name.is_empty() || table_name.contains(['/', '\\']) || table_name.ends_with(TABLE_EXTENSION) {
            return Err(WriterError::InvalidData(format!("invalid primary table name '{}'", table_name)));
        }

        let layout = validate_records(collection.kind, &collection.records)?;

        let known: HashSet<RecordId> = collection.ids().cloned().collect();
        let metadata = collection.metadata.with_id_type(layout.id_type);
        let issues = metadata.validate(&known);
        if !issues.is_empty() {
            return Err(MetadataKeyErrors(issues).into());
        }

        let mut names = HashSet::new();
        let mut dangling = Vec::new();
        for table in &collection.secondary {
            table.validate_name()?;
            if table.name() == table_name || !names.insert(table.name()) {
                return Err(ArchiveError::DuplicateTable(table.name().to_string()).into());
            }
            let orphans = find_dangling(table, &known, layout.id_type)?;
            for orphan in &orphans {
                warn!("Dangling reference: {}", orphan);
            }
            dangling.extend(orphans);
        }

        let format = match config.container_format {
            ContainerFormat::Auto if collection.secondary.is_empty() => ContainerKind::Bare,
            ContainerFormat::Auto | ContainerFormat::Archive => ContainerKind::Archive,
            ContainerFormat::Bare if collection.secondary.is_empty() => ContainerKind::Bare,
            ContainerFormat::Bare => {
                return Err(WriterError::InvalidData(
                    "a bare container cannot hold secondary tables".to_string(),
                ))
            }
        };

        let mut order: Vec<&Neuron> = collection.records.iter().collect();
        if config.sort_by_id {
            order.sort_by(|a, b| a.id().cmp(b.id()));
        }

        let mut footer = primary_footer(&layout, table_name, order.len(), config.sort_by_id);
        footer.extend(metadata.to_key_values());

        Ok(Self {
            collection,
            layout,
            order,
            footer,
            format,
            dangling,
        })
    }

    fn write_primary<W: Write + Send>(&self, sink: W, config: &WriterConfig) -> Result<(W, WriterStats), WriterError> {
        let mut writer = NeuronTableWriter::new(sink, self.layout.clone(), config, &self.footer)?;
        writer.write_records(&self.order)?;
        writer.finish()
    }

    /// Write the container to `sink`
    fn write<W: Write + Seek + Send>(&self, sink: W, config: &WriterConfig) -> Result<(W, WriterStats), WriterError> {
        match self.format {
            ContainerKind::Bare => self.write_primary(sink, config),
            ContainerKind::Archive => {
                // The primary table is spooled to an anonymous temp file, then
                // copied into its stored entry
                let (mut spool, stats) = self.write_primary(tempfile::tempfile()?, config)?;
                spool.seek(SeekFrom::Start(0))?;

                let mut composer = ArchiveComposer::new(sink);
                let entry = format!("{}{}", config.primary_table_name, TABLE_EXTENSION);
                composer.add_primary(&entry, BufReader::new(spool))?;
                for table in &self.collection.secondary {
                    composer.add_secondary_table(table, config)?;
                }
                Ok((composer.finish()?, stats))
            }
        }
    }

    fn report(self, stats: WriterStats) -> PackReport {
        PackReport {
            stats,
            dangling: self.dangling,
            format: self.format,
            secondary_tables: self.collection.secondary.len(),
        }
    }
}

/// Pack a collection into container bytes.
///
/// Everything is validated first: records against the schema rules,
/// metadata against the collection's ids, and secondary tables for usable
/// names and id columns. Dangling secondary references are reported, not
/// rejected.
///
/// # Example
/// ```rust
/// use morphpack::dataset::{pack, NeuronCollection};
/// use morphpack::record::{NeuronKind, Skeleton, SkeletonNode};
/// use morphpack::writer::WriterConfig;
///
/// let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
/// collection.push(Skeleton::new(12345, vec![SkeletonNode::root(1, 0.0, 0.0, 0.0)]));
/// collection.metadata.insert(12345, "name", "Humpty");
///
/// let (bytes, report) = pack(&collection, &WriterConfig::default())?;
/// assert_eq!(&bytes[..4], b"PAR1");
/// assert_eq!(report.stats.records_written, 1);
/// # Ok::<(), morphpack::writer::WriterError>(())
/// ```
pub fn pack(collection: &NeuronCollection, config: &WriterConfig) -> Result<(Vec<u8>, PackReport), WriterError> {
    let prepared = PreparedPack::new(collection, config)?;
    let (cursor, mut stats) = prepared.write(Cursor::new(Vec::new()), config)?;
    let bytes = cursor.into_inner();
    stats.file_size_bytes = bytes.len() as u64;
    Ok((bytes, prepared.report(stats)))
}

fn persist_error(path: &Path, error: std::io::Error) -> WriterError {
    if error.kind() == std::io::ErrorKind::AlreadyExists {
        WriterError::AlreadyExists(path.to_path_buf())
    } else {
        WriterError::IoError(error)
    }
}

/// Pack a collection and publish it atomically at `path`.
///
/// The container is built in a temporary file next to the destination and
/// renamed into place once complete, so readers never observe a partial
/// container. On any failure the temporary file is removed and the
/// destination is untouched. An existing destination is only replaced when
/// `config.overwrite` is set.
pub fn write_container<P: AsRef<Path>>(
    path: P,
    collection: &NeuronCollection,
    config: &WriterConfig,
) -> Result<PackReport, WriterError> {
    let path = path.as_ref();
    let prepared = PreparedPack::new(collection, config)?;

    if !config.overwrite && path.exists() {
        return Err(WriterError::AlreadyExists(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if path.file_name().is_none() || !dir.is_dir() {
        return Err(WriterError::InvalidPath(path.display().to_string()));
    }

    let mut staging = tempfile::Builder::new()
        .prefix(".morphpack-")
        .suffix(".tmp")
        .tempfile_in(&dir)?;

    let (sink, mut stats) = prepared.write(BufWriter::new(staging.as_file_mut()), config)?;
    sink.into_inner().map_err(|e| e.into_error())?;
    staging.as_file().sync_all()?;
    stats.file_size_bytes = staging.as_file().metadata()?.len();

    let persisted = if config.overwrite {
        staging.persist(path)
    } else {
        staging.persist_noclobber(path)
    };
    persisted.map_err(|e| persist_error(path, e.error))?;

    info!("Published {} ({})", path.display(), stats);
    Ok(prepared.report(stats))
}

