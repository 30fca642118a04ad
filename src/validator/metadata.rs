use std::collections::HashSet;

use anyhow::Result;

use crate::reader::NeuronReader;
use crate::record::RecordId;

use super::{ValidationCheck, ValidationReport};

/// Step 3: Record metadata keys
///
/// Keys are decoded against the record ids present in the primary table.
pub(crate) fn check_record_metadata(
    reader: &NeuronReader,
    known: &HashSet<RecordId>,
    report: &mut ValidationReport,
) -> Result<()> {
    let decoded = reader.record_metadata(Some(known));

    if decoded.issues.is_empty() {
        report.add_check(ValidationCheck::ok(format!(
            "Record metadata ({} entries for {} records)",
            decoded.metadata.len(),
            decoded.metadata.records().count()
        )));
    } else {
        let shown: Vec<String> = decoded.issues.iter().take(3).map(|e| e.to_string()).collect();
        report.add_check(ValidationCheck::warning(
            "Record metadata",
            format!("{} problem(s): {}", decoded.issues.len(), shown.join("; ")),
        ));
    }

    if !decoded.unparsed.is_empty() {
        let keys: Vec<&str> = decoded.unparsed.keys().map(String::as_str).collect();
        report.add_check(ValidationCheck::warning(
            "Footer keys",
            format!("Undecodable keys kept verbatim: {}", keys.join(", ")),
        ));
    }

    Ok(())
}
