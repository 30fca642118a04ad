use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use morphpack::reader::{ContainerKind, FileMetadata, NeuronReader};

#[derive(Serialize)]
struct ContainerInfo<'a> {
    file: String,
    container: ContainerKind,
    primary_entry: Option<&'a str>,
    secondary_tables: Vec<String>,
    records: usize,
    metadata_entries: usize,
    footer: &'a FileMetadata,
}

fn preview(value: &str) -> String {
    if value.chars().count() > 100 {
        let head: String = value.chars().take(100).collect();
        format!("{}... ({} bytes)", head, value.len())
    } else {
        value.to_string()
    }
}

/// Display information about a container
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let reader = NeuronReader::open(&file).context("Failed to open container")?;
    let metadata = reader.metadata();
    let records = reader.ids().context("Failed to read record ids")?.len();
    let metadata_entries = reader.record_metadata(None).metadata.len();

    if json {
        let info = ContainerInfo {
            file: file.display().to_string(),
            container: reader.container_kind(),
            primary_entry: reader.primary_entry(),
            secondary_tables: reader.secondary_names(),
            records,
            metadata_entries,
            footer: metadata,
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("morphpack Container Information");
    println!("===============================");
    println!("File: {}", file.display());
    println!("Container: {}", reader.container_kind());
    if let Some(entry) = reader.primary_entry() {
        println!("Primary table: {}", entry);
    }
    println!();

    println!("Table Statistics:");
    println!("  Kind: {}", metadata.kind);
    println!("  Id type: {}", metadata.id_type);
    println!("  Records: {}", records);
    println!("  Total rows: {}", metadata.total_rows);
    println!("  Row groups: {}", metadata.num_row_groups);
    println!("  Sorted by id: {}", metadata.sorted_by_id);
    println!("  Metadata entries: {}", metadata_entries);
    println!();

    let secondary = reader.secondary_names();
    if !secondary.is_empty() {
        println!("Secondary Tables:");
        for name in &secondary {
            println!("  {}", name);
        }
        println!();
    }

    println!("Footer Keys:");
    for (key, value) in &metadata.key_value_metadata {
        println!("  {}: {}", key, preview(value));
    }
    println!();

    println!("Schema:");
    for (i, field) in metadata.schema.fields().iter().enumerate() {
        println!("  {:3}. {} ({})", i + 1, field.name(), field.data_type());
    }

    Ok(())
}
