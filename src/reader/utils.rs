use std::collections::HashSet;

use arrow::array::{Array, ArrayRef, BooleanArray, Float32Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::record::{IdType, RecordId};

use super::ReaderError;

/// Get a column by name cast to `data_type`, or `None` if absent.
pub(super) fn get_cast_column(
    batch: &RecordBatch,
    name: &str,
    data_type: &DataType,
) -> Result<Option<ArrayRef>, ReaderError> {
    match batch.column_by_name(name) {
        Some(column) if column.data_type() == data_type => Ok(Some(column.clone())),
        Some(column) => cast(column, data_type).map(Some).map_err(|e| {
            ReaderError::CorruptTable(format!("column '{}' cannot be read as {:?}: {}", name, data_type, e))
        }),
        None => Ok(None),
    }
}

/// Get a required column by name cast to `data_type`.
pub(super) fn get_required_column(
    batch: &RecordBatch,
    name: &str,
    data_type: &DataType,
) -> Result<ArrayRef, ReaderError> {
    get_cast_column(batch, name, data_type)?
        .ok_or_else(|| ReaderError::CorruptTable(format!("missing required column '{}'", name)))
}

/// Downcast an Int64 array
pub(super) fn as_int64<'a>(array: &'a ArrayRef, name: &str) -> Result<&'a Int64Array, ReaderError> {
    array
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| ReaderError::InvalidFormat(format!("{} is not Int64", name)))
}

/// Downcast a Float32 array
pub(super) fn as_float32<'a>(array: &'a ArrayRef, name: &str) -> Result<&'a Float32Array, ReaderError> {
    array
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| ReaderError::InvalidFormat(format!("{} is not Float32", name)))
}

/// Downcast a Utf8 array
pub(super) fn as_string<'a>(array: &'a ArrayRef, name: &str) -> Result<&'a StringArray, ReaderError> {
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ReaderError::InvalidFormat(format!("{} is not Utf8", name)))
}

/// Decode an identifier column into record ids. Null ids are corrupt.
pub(super) fn read_id_column(batch: &RecordBatch, name: &str, id_type: IdType) -> Result<Vec<RecordId>, ReaderError> {
    let column = get_required_column(batch, name, &id_type.data_type())?;
    if column.null_count() > 0 {
        return Err(ReaderError::CorruptTable(format!("column '{}' contains null record ids", name)));
    }
    match id_type {
        IdType::Int => Ok(as_int64(&column, name)?.values().iter().map(|v| RecordId::Int(*v)).collect()),
        IdType::Str => Ok(as_string(&column, name)?
            .iter()
            .map(|v| RecordId::Str(v.unwrap_or_default().to_string()))
            .collect()),
    }
}

/// Row mask selecting rows whose identifier is in `wanted`.
///
/// Null identifiers never match.
pub(super) fn id_mask(
    batch: &RecordBatch,
    name: &str,
    id_type: IdType,
    wanted: &HashSet<RecordId>,
) -> Result<BooleanArray, ReaderError> {
    let column = get_required_column(batch, name, &id_type.data_type())?;
    let mask = match id_type {
        IdType::Int => as_int64(&column, name)?
            .iter()
            .map(|v| Some(v.map(|v| wanted.contains(&RecordId::Int(v))).unwrap_or(false)))
            .collect(),
        IdType::Str => as_string(&column, name)?
            .iter()
            .map(|v| {
                Some(
                    v.map(|v| wanted.contains(&RecordId::Str(v.to_string())))
                        .unwrap_or(false),
                )
            })
            .collect(),
    };
    Ok(mask)
}
