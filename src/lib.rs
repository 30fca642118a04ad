//! # morphpack - Columnar Containers for Neuron Morphologies
//!
//! `morphpack` packs many neuron morphologies into a single Apache Parquet
//! table and reads any subset of them back without materializing the rest.
//!
//! ## Key Features
//!
//! - **One table, many records**: Skeleton nodes or dotprops points of every
//!   record share one long table, tagged by the reserved `neuron` column.
//!
//! - **Selective reads**: Rows are grouped by record and row groups carry
//!   `neuron` statistics, so reading a handful of records skips most of the
//!   file.
//!
//! - **Per-record metadata**: Arbitrary key/value properties travel in the
//!   Parquet footer as `"{record_id}:{property}"` entries.
//!
//! - **Relational side tables**: Synapses and other tables keyed by record id
//!   ride along in a ZIP archive next to the primary table.
//!
//! - **Plain Parquet at rest**: A bare container is an ordinary Parquet file
//!   any Parquet tool can open.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use morphpack::dataset::{read_container, write_container, NeuronCollection};
//! use morphpack::record::{NeuronKind, RecordId, Skeleton, SkeletonNode};
//! use morphpack::writer::WriterConfig;
//!
//! let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
//! for id in [12345i64, 67890] {
//!     collection.push(Skeleton::new(
//!         id,
//!         vec![
//!             SkeletonNode::root(1, 0.0, 0.0, 0.0),
//!             SkeletonNode::new(2, 1, 1.0, 2.0, 3.0).with_radius(0.5),
//!         ],
//!     ));
//! }
//! collection.metadata.insert(12345, "name", "Humpty");
//! collection.metadata.insert(67890, "name", "Dumpty");
//!
//! write_container("neurons.parquet", &collection, &WriterConfig::default())?;
//!
//! let unpacked = read_container("neurons.parquet", Some(&[RecordId::Int(67890)]))?;
//! assert_eq!(unpacked.collection.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Reading Containers Elsewhere
//!
//! ```python
//! # Python
//! import pyarrow.parquet as pq
//! table = pq.read_table("neurons.parquet", filters=[("neuron", "in", [67890])])
//! ```
//!
//! ```sql
//! -- DuckDB
//! SELECT * FROM read_parquet('neurons.parquet') WHERE neuron = 67890;
//! ```
//!
//! ## Architecture
//!
//! - [`record`]: Skeleton, dotprops and record id data model
//! - [`schema`]: Column contract, footer keys and record validation
//! - [`metadata`]: Per-record key/value metadata codec
//! - [`writer`]: Record-aligned Parquet table writer
//! - [`reader`]: Container reader with row-group pruning
//! - [`archive`]: Secondary tables and ZIP archive composition
//! - [`dataset`]: Whole-collection pack/unpack and atomic publish
//! - [`validator`]: Deep container validation

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod archive;
pub mod dataset;
pub mod metadata;
pub mod reader;
pub mod record;
pub mod schema;
pub mod validator;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::archive::{SecondaryTable, Synapse, SynapseKind};
    pub use crate::dataset::{pack, read_container, unpack, write_container, NeuronCollection, PackReport, Unpacked};
    pub use crate::metadata::{MetaValue, RecordMetadata};
    pub use crate::reader::{NeuronReader, ReadOutcome, ReaderConfig, ReaderError};
    pub use crate::record::{Dotprops, IdType, Neuron, NeuronKind, RecordId, Skeleton, SkeletonNode};
    pub use crate::schema::{columns, SchemaError};
    pub use crate::validator::{validate_container, ValidationReport};
    pub use crate::writer::{CompressionType, ContainerFormat, WriterConfig, WriterError, WriterStats};
}
