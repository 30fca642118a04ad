//! Row-group pruning on `neuron` column statistics.
//!
//! Statistics are a hint. A row group is skipped only when its min/max
//! statistics are present, decodable and consistent, and no requested id
//! falls inside the range. Everything else is scanned.

use std::collections::BTreeSet;

use log::debug;
use parquet::basic::{ConvertedType, LogicalType};
use parquet::file::metadata::{ParquetMetaData, RowGroupMetaData};
use parquet::file::statistics::Statistics;

use crate::record::{IdType, RecordId};

/// Outcome of pruning row groups for an id lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowGroupSelection {
    /// Row groups that have to be read
    pub selected: Vec<usize>,
    /// Row groups skipped because their id range excludes every requested id
    pub pruned: usize,
    /// Selected row groups that had no usable statistics
    pub unpruned: usize,
}

impl RowGroupSelection {
    /// Total number of row groups considered
    pub fn total(&self) -> usize {
        self.selected.len() + self.pruned
    }
}

/// True when an integer leaf is annotated as unsigned
fn is_unsigned(row_group: &RowGroupMetaData, column: usize) -> bool {
    let descr = row_group.column(column).column_descr();
    match descr.logical_type() {
        Some(LogicalType::Integer { is_signed, .. }) => !is_signed,
        _ => matches!(
            descr.converted_type(),
            ConvertedType::UINT_8 | ConvertedType::UINT_16 | ConvertedType::UINT_32 | ConvertedType::UINT_64
        ),
    }
}

/// Inclusive id range from chunk statistics, `None` when unusable
///
/// Unsigned columns keep their bit pattern in the physical INT32/INT64
/// statistics, so they are reinterpreted before comparing.
pub(crate) fn id_range(row_group: &RowGroupMetaData, column: usize, id_type: IdType) -> Option<(RecordId, RecordId)> {
    let stats = row_group.column(column).statistics()?;
    let unsigned = is_unsigned(row_group, column);
    let (min, max) = match (id_type, stats) {
        (IdType::Int, Statistics::Int64(_)) if unsigned => return None,
        (IdType::Int, Statistics::Int64(s)) => (RecordId::Int(*s.min_opt()?), RecordId::Int(*s.max_opt()?)),
        (IdType::Int, Statistics::Int32(s)) if unsigned => (
            RecordId::Int(i64::from(*s.min_opt()? as u32)),
            RecordId::Int(i64::from(*s.max_opt()? as u32)),
        ),
        (IdType::Int, Statistics::Int32(s)) => (
            RecordId::Int(i64::from(*s.min_opt()?)),
            RecordId::Int(i64::from(*s.max_opt()?)),
        ),
        (IdType::Str, Statistics::ByteArray(s)) => {
            let min = std::str::from_utf8(s.min_opt()?.data()).ok()?;
            let max = std::str::from_utf8(s.max_opt()?.data()).ok()?;
            (RecordId::Str(min.to_string()), RecordId::Str(max.to_string()))
        }
        _ => return None,
    };
    (min <= max).then_some((min, max))
}

/// Choose the row groups that may contain any of `wanted`.
///
/// `id_column` is the leaf index of the identifier column. Row groups
/// without usable statistics are always selected, so unsorted or
/// statistics-free tables degrade to a full scan.
pub fn select_row_groups(
    metadata: &ParquetMetaData,
    id_column: usize,
    id_type: IdType,
    wanted: &BTreeSet<RecordId>,
) -> RowGroupSelection {
    let mut selection = RowGroupSelection::default();

    for (index, row_group) in metadata.row_groups().iter().enumerate() {
        match id_range(row_group, id_column, id_type) {
            Some((min, max)) => {
                if wanted.range(min.clone()..=max.clone()).next().is_some() {
                    selection.selected.push(index);
                } else {
                    debug!("Pruning row group {} (ids {}..={})", index, min, max);
                    selection.pruned += 1;
                }
            }
            None => {
                debug!("Row group {} has no usable id statistics, scanning it", index);
                selection.selected.push(index);
                selection.unpruned += 1;
            }
        }
    }

    debug!(
        "Selected {} of {} row groups for {} ids",
        selection.selected.len(),
        selection.total(),
        wanted.len()
    );
    selection
}
