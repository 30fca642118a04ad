use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::path::PathBuf;

use morphpack::dataset::{read_container, write_container};
use morphpack::record::RecordId;
use morphpack::writer::WriterConfig;

/// Copy a subset of records into a new container
///
/// Metadata and secondary rows of the selected records come along.
pub fn run(input: PathBuf, output: PathBuf, ids: Vec<String>, config: WriterConfig) -> Result<()> {
    let requested: Vec<RecordId> = ids.iter().map(|id| RecordId::from(id.trim())).collect();
    info!("Extracting {} records from {}", requested.len(), input.display());

    let unpacked = read_container(&input, Some(&requested))
        .with_context(|| format!("Failed to read {}", input.display()))?;

    if !unpacked.missing.is_empty() {
        let missing: Vec<String> = unpacked.missing.iter().map(|id| id.to_string()).collect();
        warn!("Not found in {}: {}", input.display(), missing.join(", "));
    }
    if unpacked.collection.is_empty() {
        bail!("None of the requested records are in {}", input.display());
    }

    let report = write_container(&output, &unpacked.collection, &config)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Extracted {} of {} records into {}",
        unpacked.collection.len(),
        requested.len(),
        output.display()
    );
    println!("  {}", report);
    Ok(())
}
