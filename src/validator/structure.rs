use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::Result;
use zip::{CompressionMethod, ZipArchive};

use crate::reader::{detect_container, ContainerKind, NeuronReader, ReaderError};
use crate::schema::{TABLE_EXTENSION, ZIP_COMMENT_PRIMARY_PREFIX};

use super::{ValidationCheck, ValidationError, ValidationReport};

/// Step 1: Structure validation
///
/// Returns an open reader once the primary table has been located and its
/// footer parsed.
pub(crate) fn check_structure(path: &Path, report: &mut ValidationReport) -> Result<NeuronReader> {
    if !path.is_file() {
        report.add_check(ValidationCheck::failed(
            "Path is a file",
            format!("Not a file: {}", path.display()),
        ));
        anyhow::bail!(ValidationError::StructureError("Path is not a file".to_string()));
    }
    report.add_check(ValidationCheck::ok("Path is a file"));

    let mut head = [0u8; 4];
    let read = File::open(path)?.read(&mut head)?;
    let container = match detect_container(&head[..read]) {
        Ok(kind) => kind,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Container format", e.to_string()));
            anyhow::bail!(ValidationError::StructureError(e.to_string()));
        }
    };
    report.add_check(ValidationCheck::ok(format!("Container format: {}", container)));

    if container == ContainerKind::Archive {
        check_archive_entries(path, report)?;
    }

    match NeuronReader::open(path) {
        Ok(reader) => {
            let entry = reader.primary_entry().unwrap_or("bare table").to_string();
            report.add_check(ValidationCheck::ok(format!("Primary table readable ({})", entry)));
            Ok(reader)
        }
        Err(ReaderError::CorruptTable(message)) => {
            report.add_check(ValidationCheck::failed("Column contract", message.clone()));
            anyhow::bail!(ValidationError::SchemaError(message));
        }
        Err(e) => {
            report.add_check(ValidationCheck::failed("Primary table readable", e.to_string()));
            Err(e.into())
        }
    }
}

/// Archive entries: table streams must be Stored so they can be read in place
fn check_archive_entries(path: &Path, report: &mut ValidationReport) -> Result<()> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;

    let mut deflated = Vec::new();
    let mut foreign = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        if !entry.name().ends_with(TABLE_EXTENSION) {
            foreign.push(entry.name().to_string());
        } else if entry.compression() != CompressionMethod::Stored {
            deflated.push(entry.name().to_string());
        }
    }

    if deflated.is_empty() {
        report.add_check(ValidationCheck::ok("Table entries are stored (seekable)"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Table entries are stored (seekable)",
            format!("Compressed table entries: {}", deflated.join(", ")),
        ));
    }

    if !foreign.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Archive entries",
            format!("Ignoring non-table entries: {}", foreign.join(", ")),
        ));
    }

    let comment = String::from_utf8_lossy(archive.comment());
    let declared = comment
        .lines()
        .any(|line| line.trim().starts_with(ZIP_COMMENT_PRIMARY_PREFIX));
    if declared {
        report.add_check(ValidationCheck::ok("Primary table declared"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Primary table declared",
            "Archive comment does not name the primary table; using the fallback entry",
        ));
    }

    Ok(())
}
