use std::collections::HashSet;

use anyhow::Result;

use crate::archive::find_dangling;
use crate::reader::{NeuronReader, ReaderError};
use crate::record::{Neuron, RecordId};

use super::{ValidationCheck, ValidationReport};

/// Step 4: Data sanity validation
pub(crate) fn check_data_sanity(
    reader: &NeuronReader,
    ids: &[RecordId],
    report: &mut ValidationReport,
) -> Result<()> {
    check_record_count(reader, ids, report);
    check_records(reader, report)?;
    check_row_groups(reader, report)?;
    Ok(())
}

fn check_record_count(reader: &NeuronReader, ids: &[RecordId], report: &mut ValidationReport) {
    match reader.metadata().record_count {
        Some(declared) if declared == ids.len() => {
            report.add_check(ValidationCheck::ok(format!("Record count: {}", declared)));
        }
        Some(declared) => {
            report.add_check(ValidationCheck::failed(
                "Record count",
                format!("Footer declares {} records, table holds {}", declared, ids.len()),
            ));
        }
        None => {
            report.add_check(ValidationCheck::warning(
                "Record count",
                format!("Footer does not declare a record count ({} records found)", ids.len()),
            ));
        }
    }
}

/// Decode every record: skeleton graphs must be forests and coordinates finite
fn check_records(reader: &NeuronReader, report: &mut ValidationReport) -> Result<()> {
    let records = match reader.read_all() {
        Ok(records) => records,
        Err(ReaderError::CorruptTable(message)) => {
            report.add_check(ValidationCheck::failed("Record rows", message));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    report.add_check(ValidationCheck::ok(format!("Record rows ({} {} records)", records.len(), reader.kind())));

    let non_finite: Vec<String> = records
        .iter()
        .filter(|record| !coordinates_finite(record))
        .map(|record| record.id().to_string())
        .collect();
    if non_finite.is_empty() {
        report.add_check(ValidationCheck::ok("Coordinates are finite"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Coordinates are finite",
            format!("NaN or infinite coordinates in records: {}", non_finite.join(", ")),
        ));
    }
    Ok(())
}

fn coordinates_finite(record: &Neuron) -> bool {
    match record {
        Neuron::Skeleton(s) => s
            .nodes
            .iter()
            .all(|n| n.x.is_finite() && n.y.is_finite() && n.z.is_finite()),
        Neuron::Dotprops(d) => d.points.iter().flatten().all(|v| v.is_finite()),
    }
}

/// Row-group id ranges decide how much a selective read has to scan
fn check_row_groups(reader: &NeuronReader, report: &mut ValidationReport) -> Result<()> {
    let ranges = reader.row_group_id_ranges()?;
    let missing = ranges.iter().filter(|r| r.is_none()).count();
    if missing > 0 {
        report.add_check(ValidationCheck::warning(
            "Row-group id statistics",
            format!(
                "{} of {} row groups lack neuron statistics; selective reads scan them",
                missing,
                ranges.len()
            ),
        ));
        return Ok(());
    }
    report.add_check(ValidationCheck::ok(format!("Row-group id statistics ({} groups)", ranges.len())));

    if !reader.metadata().sorted_by_id {
        return Ok(());
    }
    let bounds: Vec<_> = ranges.into_iter().flatten().collect();
    let overlapping = bounds.windows(2).filter(|w| w[0].1 > w[1].0).count();
    if overlapping == 0 {
        report.add_check(ValidationCheck::ok("Row groups sorted by id"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Row groups sorted by id",
            format!(
                "Footer declares sorted ids but {} adjacent row group pair(s) overlap",
                overlapping
            ),
        ));
    }
    Ok(())
}

/// Step 5: Secondary tables must reference records of the primary table
pub(crate) fn check_secondary_tables(
    reader: &NeuronReader,
    known: &HashSet<RecordId>,
    report: &mut ValidationReport,
) -> Result<()> {
    for name in reader.secondary_names() {
        let check_name = format!("Secondary table '{}'", name);
        let table = match reader.read_secondary(&name) {
            Ok(table) => table,
            Err(e) => {
                report.add_check(ValidationCheck::failed(check_name, e.to_string()));
                continue;
            }
        };

        let dangling = match find_dangling(&table, known, reader.id_type()) {
            Ok(dangling) => dangling,
            Err(e) => {
                report.add_check(ValidationCheck::failed(check_name, e.to_string()));
                continue;
            }
        };

        if dangling.is_empty() {
            report.add_check(ValidationCheck::ok(format!(
                "{} ({} rows, key '{}')",
                check_name,
                table.num_rows(),
                table.id_column()
            )));
        } else {
            let rows: usize = dangling.iter().map(|d| d.rows).sum();
            let records: Vec<String> = dangling.iter().take(5).map(|d| d.record.to_string()).collect();
            report.add_check(ValidationCheck::warning(
                check_name,
                format!(
                    "{} row(s) reference {} missing record(s): {}",
                    rows,
                    dangling.len(),
                    records.join(", ")
                ),
            ));
        }
    }
    Ok(())
}
