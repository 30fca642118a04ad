//! # Table packer
//!
//! Writes many neuron records into one Parquet table tagged by the `neuron`
//! column.
//!
//! ## Design Principles
//!
//! 1. **Record-aligned row groups**: Row groups close at record boundaries, so
//!    each group's `neuron` statistics describe a narrow id range that readers
//!    can use to skip it.
//!
//! 2. **Order preservation**: Rows of a record keep their original order;
//!    sorting by id (on by default) is stable.
//!
//! 3. **Self-describing tables**: Format keys and record metadata live in the
//!    Parquet footer's key_value_metadata.
//!
//! 4. **Configurable Compression**: Supports ZSTD (default), Snappy, and uncompressed.

mod batch;
mod config;
mod error;
mod footer;
mod stats;
mod writer_impl;


pub use config::{CompressionType, ContainerFormat, WriterConfig};
pub use error::WriterError;
pub use stats::WriterStats;
pub use writer_impl::NeuronTableWriter;

pub(crate) use batch::build_record_batch;
pub(crate) use footer::{primary_footer, secondary_footer};
