use crate::archive::SecondaryTable;
use crate::metadata::RecordMetadata;
use crate::record::{Neuron, NeuronKind, RecordId};

/// Records of one kind with their metadata and secondary tables.
///
/// This is the unit that gets packed into a container and what unpacking
/// returns.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuronCollection {
    /// Record kind of every record
    pub kind: NeuronKind,
    /// Records in caller order
    pub records: Vec<Neuron>,
    /// Per-record key/value metadata
    pub metadata: RecordMetadata,
    /// Secondary relational tables
    pub secondary: Vec<SecondaryTable>,
}

impl NeuronCollection {
    /// Create an empty collection
    pub fn new(kind: NeuronKind) -> Self {
        Self {
            kind,
            records: Vec::new(),
            metadata: RecordMetadata::new(),
            secondary: Vec::new(),
        }
    }

    /// Create a collection from records
    pub fn with_records(kind: NeuronKind, records: Vec<Neuron>) -> Self {
        Self {
            records,
            ..Self::new(kind)
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: RecordMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a secondary table
    pub fn with_secondary(mut self, table: SecondaryTable) -> Self {
        self.secondary.push(table);
        self
    }

    /// Append a record
    pub fn push(&mut self, record: impl Into<Neuron>) {
        self.records.push(record.into());
    }

    /// Record ids in collection order
    pub fn ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records.iter().map(Neuron::id)
    }

    /// Look up a record
    pub fn get(&self, id: &RecordId) -> Option<&Neuron> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Look up a secondary table by name
    pub fn secondary(&self, name: &str) -> Option<&SecondaryTable> {
        self.secondary.iter().find(|t| t.name() == name)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the collection holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
