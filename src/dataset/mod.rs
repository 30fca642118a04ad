//! # Collection Facade
//!
//! Packs a whole [`NeuronCollection`] into a container and reads it back.
//!
//! ## Container Layouts
//!
//! A collection without secondary tables is written as a bare Parquet table.
//! With secondary tables (or when an archive is requested) the container is
//! a ZIP archive:
//!
//! ```text
//! {name}.zip
//! ├── neurons.parquet       # Primary table (Stored, never deflated)
//! ├── synapses.parquet      # Secondary table keyed by `neuron`
//! └── ...
//! archive comment: "morphpack:primary=neurons.parquet"
//! ```
//!
//! ## Publishing
//!
//! [`write_container`] stages the container in a temporary file in the
//! destination directory and renames it into place, so a crash never leaves
//! a half-written container behind.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use morphpack::dataset::{read_container, write_container, NeuronCollection};
//! use morphpack::record::{NeuronKind, Skeleton, SkeletonNode};
//! use morphpack::writer::WriterConfig;
//!
//! let mut collection = NeuronCollection::new(NeuronKind::Skeleton);
//! collection.push(Skeleton::new(
//!     12345,
//!     vec![
//!         SkeletonNode::root(1, 0.0, 0.0, 0.0),
//!         SkeletonNode::new(2, 1, 1.0, 0.0, 0.0),
//!     ],
//! ));
//! collection.metadata.insert(12345, "name", "Humpty");
//!
//! let report = write_container("collection.parquet", &collection, &WriterConfig::default())?;
//! println!("{}", report);
//!
//! let unpacked = read_container("collection.parquet", None)?;
//! assert_eq!(unpacked.collection.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod collection;
mod pack;
mod stats;
mod unpack;

#[cfg(test)]
mod tests;

pub use collection::NeuronCollection;
pub use pack::{pack, write_container};
pub use stats::PackReport;
pub use unpack::{read_container, unpack, unpack_reader, Unpacked};
