//! # Container Validation
//!
//! Deep integrity validation for neuron containers, bare Parquet tables and
//! ZIP archives alike.
//!
//! ## Validation Checklist
//!
//! 1. **Structure**: magic bytes, stored table entries, primary table declaration
//! 2. **Schema Contract**: footer format keys, required columns, id type
//! 3. **Record Metadata**: every `{record_id}:{property}` key decodes and
//!    references a record of the table
//! 4. **Data Sanity**: record count, skeleton graphs, finite coordinates,
//!    row-group id ranges
//! 5. **Secondary Tables**: foreign keys reference existing records
//!
//! Structural problems abort validation with an error; everything else is
//! recorded in the report.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use morphpack::validator::validate_container;
//! use std::path::Path;
//!
//! match validate_container(Path::new("collection.zip")) {
//!     Ok(report) => println!("{}", report),
//!     Err(e) => eprintln!("Validation failed: {}", e),
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use log::debug;

pub use report::{CheckStatus, Tally, ValidationCheck, ValidationReport};

use crate::record::RecordId;

mod data;
mod metadata;
mod report;
mod schema;
mod structure;

/// Validation error types
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Error in file or archive structure
    #[error("Structure error: {0}")]
    StructureError(String),

    /// Primary table breaks the column contract
    #[error("Schema error: {0}")]
    SchemaError(String),
}

/// Main validation entry point
pub fn validate_container(path: &Path) -> Result<ValidationReport> {
    let mut report = ValidationReport::new(path.display().to_string());

    // 1. Structure Check
    let reader = structure::check_structure(path, &mut report)?;

    // 2. Schema Contract Check
    schema::check_schema_contract(&reader, &mut report)?;

    let ids = reader.ids()?;
    let known: HashSet<RecordId> = ids.iter().cloned().collect();
    debug!("Validating {} records of {}", ids.len(), path.display());

    // 3. Record Metadata Check
    metadata::check_record_metadata(&reader, &known, &mut report)?;

    // 4. Data Sanity Check
    data::check_data_sanity(&reader, &ids, &mut report)?;

    // 5. Secondary Table Check
    data::check_secondary_tables(&reader, &known, &mut report)?;

    Ok(report)
}
