//! # Primary table schema
//!
//! A primary table stores the rows of many neuron records, one row per
//! skeleton node or dotprops point, tagged by the record identifier in the
//! reserved `neuron` column.
//!
//! ## Schema Columns
//!
//! | Column | Type | Kind | Description |
//! |--------|------|------|-------------|
//! | node_id | Int64 | skeleton | Node identifier, unique per record |
//! | parent_id | Int64 | skeleton | Parent node, `-1` for roots |
//! | x, y, z | Float32 | both | Coordinates |
//! | radius | Float32 (nullable) | skeleton | Node radius |
//! | vec_x, vec_y, vec_z | Float32 (nullable) | dotprops | Tangent vector |
//! | alpha | Float32 (nullable) | dotprops | Linearity |
//! | neuron | Int64 or Utf8 | both | Record identifier |
//!
//! Any other column is an opaque pass-through column.
//!
//! ## Pruning
//!
//! Rows are grouped by record so that each row group covers a narrow range of
//! `neuron` values. Column chunk statistics on `neuron` let readers skip row
//! groups that cannot contain a requested record.

mod builders;
/// Primary table column name constants.
pub mod columns;
mod constants;
mod validation;


pub use builders::{create_table_schema, TableLayout};
pub use constants::*;
pub use validation::{
    validate_records, validate_table_schema, SchemaError, SchemaViolation, ViolationKind,
};
