use std::collections::HashMap;

use anyhow::Result;

use crate::reader::NeuronReader;
use crate::record::IdType;
use crate::schema::{columns, FORMAT_VERSION, KEY_FORMAT_VERSION, KEY_ID_TYPE, KEY_KIND};

use super::{ValidationCheck, ValidationReport};

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Step 2: Footer keys and column contract
pub(crate) fn check_schema_contract(reader: &NeuronReader, report: &mut ValidationReport) -> Result<()> {
    let metadata = reader.metadata();
    let kv: HashMap<&str, &str> = metadata
        .key_value_metadata
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    match kv.get(KEY_FORMAT_VERSION) {
        Some(version) if major(version) == major(FORMAT_VERSION) => {
            report.add_check(ValidationCheck::ok(format!("Format version {}", version)));
        }
        Some(version) => {
            report.add_check(ValidationCheck::failed(
                "Format version",
                format!("Unsupported format version {} (expected {}.x)", version, major(FORMAT_VERSION)),
            ));
        }
        None => {
            report.add_check(ValidationCheck::warning(
                "Format version",
                format!("Footer lacks {}", KEY_FORMAT_VERSION),
            ));
        }
    }

    if kv.contains_key(KEY_KIND) {
        report.add_check(ValidationCheck::ok(format!("Record kind: {}", metadata.kind)));
    } else {
        report.add_check(ValidationCheck::warning(
            "Record kind",
            format!("Footer lacks {}; inferred {} from the columns", KEY_KIND, metadata.kind),
        ));
    }

    // The column contract itself was enforced when the table was opened
    report.add_check(ValidationCheck::ok(format!(
        "Required columns: {}",
        columns::required_columns(metadata.kind).join(", ")
    )));

    match kv.get(KEY_ID_TYPE).copied() {
        Some(raw) => match IdType::parse(raw) {
            Some(declared) if declared == metadata.id_type => {
                report.add_check(ValidationCheck::ok(format!("Id type: {}", declared)));
            }
            Some(declared) => {
                report.add_check(ValidationCheck::warning(
                    "Id type",
                    format!("Footer declares {} ids, the neuron column holds {} ids", declared, metadata.id_type),
                ));
            }
            None => {
                report.add_check(ValidationCheck::failed(
                    "Id type",
                    format!("Unknown {} value '{}'", KEY_ID_TYPE, raw),
                ));
            }
        },
        None => {
            report.add_check(ValidationCheck::warning(
                "Id type",
                format!("Footer lacks {}; using {} from the neuron column", KEY_ID_TYPE, metadata.id_type),
            ));
        }
    }

    let extra = metadata.extra_columns();
    if !extra.is_empty() {
        report.add_check(ValidationCheck::ok(format!("Pass-through columns: {}", extra.join(", "))));
    }

    Ok(())
}
