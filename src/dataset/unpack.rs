use std::collections::HashSet;
use std::path::Path;

use bytes::Bytes;
use log::{debug, warn};

use crate::metadata::MetadataKeyError;
use crate::reader::{NeuronReader, ReaderError};
use crate::record::RecordId;

use super::NeuronCollection;

/// A collection read back from a container
#[derive(Debug, Clone, PartialEq)]
pub struct Unpacked {
    /// Records, metadata and secondary tables that were read
    pub collection: NeuronCollection,
    /// Requested ids with no rows in the primary table
    pub missing: Vec<RecordId>,
    /// Metadata entries that could not be attributed to a record
    pub metadata_issues: Vec<MetadataKeyError>,
}

/// Read a collection from an open reader.
///
/// With `ids`, only those records are read, metadata is limited to them and
/// secondary tables keep only the rows that reference them. Without `ids`
/// the whole container is read and metadata for records the table lacks is
/// reported in [`Unpacked::metadata_issues`].
pub fn unpack_reader(reader: &NeuronReader, ids: Option<&[RecordId]>) -> Result<Unpacked, ReaderError> {
    let kind = reader.kind();
    let names = reader.secondary_names();

    let unpacked = match ids {
        None => {
            let records = reader.read_all()?;
            let known: HashSet<RecordId> = records.iter().map(|r| r.id().clone()).collect();
            let decoded = reader.record_metadata(Some(&known));

            let mut collection = NeuronCollection::with_records(kind, records).with_metadata(decoded.metadata);
            for name in &names {
                collection.secondary.push(reader.read_secondary(name)?);
            }
            Unpacked {
                collection,
                missing: Vec::new(),
                metadata_issues: decoded.issues,
            }
        }
        Some(ids) => {
            let outcome = reader.read_ids(ids)?;
            let present: HashSet<RecordId> = outcome.records.iter().map(|r| r.id().clone()).collect();
            let decoded = reader.record_metadata(None);
            let mut metadata = decoded.metadata;
            metadata.retain_records(&present);

            let mut collection = NeuronCollection::with_records(kind, outcome.records).with_metadata(metadata);
            for name in &names {
                collection.secondary.push(reader.read_secondary_for(name, &present)?);
            }
            Unpacked {
                collection,
                missing: outcome.missing,
                metadata_issues: decoded.issues,
            }
        }
    };

    for issue in &unpacked.metadata_issues {
        warn!("Metadata issue: {}", issue);
    }
    debug!(
        "Unpacked {} records, {} secondary tables",
        unpacked.collection.len(),
        unpacked.collection.secondary.len()
    );
    Ok(unpacked)
}

/// Read a collection from container bytes
pub fn unpack(data: impl Into<Bytes>, ids: Option<&[RecordId]>) -> Result<Unpacked, ReaderError> {
    let reader = NeuronReader::from_bytes(data.into())?;
    unpack_reader(&reader, ids)
}

/// Read a collection from a container file
pub fn read_container<P: AsRef<Path>>(path: P, ids: Option<&[RecordId]>) -> Result<Unpacked, ReaderError> {
    let reader = NeuronReader::open(path)?;
    unpack_reader(&reader, ids)
}
