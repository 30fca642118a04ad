//! # Archive composer
//!
//! A container is either a bare Parquet file holding the primary table, or a
//! ZIP archive holding the primary table plus any number of secondary tables
//! (synapse lists, annotations, ...). Every archive entry is an independent
//! Parquet file stored without ZIP compression:
//!
//! ```text
//! collection.zip
//! ├── neurons.parquet     # primary table (named in the archive comment)
//! └── synapses.parquet    # secondary table keyed by `neuron`
//! ```
//!
//! Secondary tables reference primary records through a foreign-key column.
//! References to records the primary table lacks are reported as
//! [`DanglingReference`]s and never abort a pack.

mod composer;
mod dangling;
mod error;
mod secondary;
mod synapse;

#[cfg(test)]
mod tests;

pub use composer::{write_secondary_table, ArchiveComposer};
pub use dangling::{find_dangling, DanglingReference};
pub use error::ArchiveError;
pub use secondary::SecondaryTable;
pub use synapse::{read_synapses, synapse_table, Synapse, SynapseKind, CONNECTOR_ID, SYNAPSE_TYPE};
