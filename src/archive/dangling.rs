use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::record::{IdType, RecordId};

use super::{ArchiveError, SecondaryTable};

/// Secondary rows pointing at a record the primary table does not hold.
///
/// Dangling references never stop a pack; they are collected and reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("table '{table}' references missing record {record} in {rows} row(s)")]
pub struct DanglingReference {
    /// Secondary table name
    pub table: String,
    /// Referenced record id
    pub record: RecordId,
    /// Number of rows with this reference
    pub rows: usize,
}

/// Foreign keys of `table` that match no primary record, sorted by id.
///
/// Keys are compared under the primary table's id type; null keys are not
/// references.
pub fn find_dangling(
    table: &SecondaryTable,
    primary_ids: &HashSet<RecordId>,
    primary_id_type: IdType,
) -> Result<Vec<DanglingReference>, ArchiveError> {
    let mut orphans: BTreeMap<RecordId, usize> = BTreeMap::new();
    for id in table.ids()?.into_iter().flatten() {
        let found = id
            .coerce(primary_id_type)
            .is_some_and(|id| primary_ids.contains(&id));
        if !found {
            *orphans.entry(id).or_default() += 1;
        }
    }

    Ok(orphans
        .into_iter()
        .map(|(record, rows)| DanglingReference {
            table: table.name().to_string(),
            record,
            rows,
        })
        .collect())
}
