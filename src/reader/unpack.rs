use std::collections::HashMap;

use arrow::array::{Array, ArrayRef, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::record::{Dotprops, ExtraColumns, IdType, Neuron, NeuronKind, RecordId, Skeleton, SkeletonGraph, SkeletonNode, ROOT_PARENT};
use crate::schema::columns;

use super::utils::{as_float32, as_int64, get_cast_column, get_required_column, read_id_column};
use super::ReaderError;

/// Row indices of each record, in order of first appearance
struct RowGroups {
    order: Vec<RecordId>,
    rows: HashMap<RecordId, Vec<u32>>,
}

impl RowGroups {
    fn from_ids(ids: Vec<RecordId>) -> Self {
        let mut order = Vec::new();
        let mut rows: HashMap<RecordId, Vec<u32>> = HashMap::new();
        for (row, id) in ids.into_iter().enumerate() {
            let slot = rows.entry(id).or_insert_with_key(|id| {
                order.push(id.clone());
                Vec::new()
            });
            slot.push(row as u32);
        }
        Self { order, rows }
    }

    fn iter(&self) -> impl Iterator<Item = (&RecordId, &[u32])> {
        self.order
            .iter()
            .map(|id| (id, self.rows.get(id).map(Vec::as_slice).unwrap_or_default()))
    }
}

fn non_null_float(batch: &RecordBatch, name: &str) -> Result<ArrayRef, ReaderError> {
    let column = get_required_column(batch, name, &DataType::Float32)?;
    if column.null_count() > 0 {
        return Err(ReaderError::CorruptTable(format!("column '{}' contains nulls", name)));
    }
    Ok(column)
}

/// Pass-through columns of a record; all-null columns are dropped
fn extra_columns(extras: &[(String, ArrayRef)], rows: &[u32]) -> Result<ExtraColumns, ReaderError> {
    let indices = UInt32Array::from(rows.to_vec());
    let mut out = ExtraColumns::new();
    for (name, column) in extras {
        let values = take(column.as_ref(), &indices, None)?;
        if values.null_count() < values.len() {
            out.insert(name.clone(), values);
        }
    }
    Ok(out)
}

fn assemble_skeletons(
    batch: &RecordBatch,
    groups: &RowGroups,
    extras: &[(String, ArrayRef)],
) -> Result<Vec<Neuron>, ReaderError> {
    let node_id = get_required_column(batch, columns::NODE_ID, &DataType::Int64)?;
    let node_id = as_int64(&node_id, columns::NODE_ID)?;
    if node_id.null_count() > 0 {
        return Err(ReaderError::CorruptTable("column 'node_id' contains nulls".to_string()));
    }
    let parent_id = get_required_column(batch, columns::PARENT_ID, &DataType::Int64)?;
    let parent_id = as_int64(&parent_id, columns::PARENT_ID)?;
    let coords = [
        non_null_float(batch, columns::X)?,
        non_null_float(batch, columns::Y)?,
        non_null_float(batch, columns::Z)?,
    ];
    let [x, y, z] = [
        as_float32(&coords[0], columns::X)?,
        as_float32(&coords[1], columns::Y)?,
        as_float32(&coords[2], columns::Z)?,
    ];
    let radius = get_cast_column(batch, columns::RADIUS, &DataType::Float32)?;
    let radius = radius.as_ref().map(|r| as_float32(r, columns::RADIUS)).transpose()?;

    let mut records = Vec::with_capacity(groups.order.len());
    for (id, rows) in groups.iter() {
        let nodes: Vec<SkeletonNode> = rows
            .iter()
            .map(|&row| {
                let row = row as usize;
                let parent = if parent_id.is_null(row) { ROOT_PARENT } else { parent_id.value(row) };
                let mut node = SkeletonNode::new(node_id.value(row), parent, x.value(row), y.value(row), z.value(row));
                if let Some(r) = radius.filter(|r| r.is_valid(row)) {
                    node = node.with_radius(r.value(row));
                }
                node
            })
            .collect();

        SkeletonGraph::build(&nodes).map_err(|errors| {
            let detail = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
            ReaderError::CorruptTable(format!("skeleton {}: {}", id, detail))
        })?;

        let skeleton = Skeleton::new(id.clone(), nodes).with_extra(extra_columns(extras, rows)?);
        records.push(skeleton.into());
    }
    Ok(records)
}

fn optional_floats(batch: &RecordBatch, names: &[&str]) -> Result<Option<Vec<ArrayRef>>, ReaderError> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        match get_cast_column(batch, name, &DataType::Float32)? {
            Some(column) => out.push(column),
            None => return Ok(None),
        }
    }
    Ok(Some(out))
}

fn assemble_dotprops(
    batch: &RecordBatch,
    groups: &RowGroups,
    extras: &[(String, ArrayRef)],
) -> Result<Vec<Neuron>, ReaderError> {
    let coords = [
        non_null_float(batch, columns::X)?,
        non_null_float(batch, columns::Y)?,
        non_null_float(batch, columns::Z)?,
    ];
    let [x, y, z] = [
        as_float32(&coords[0], columns::X)?,
        as_float32(&coords[1], columns::Y)?,
        as_float32(&coords[2], columns::Z)?,
    ];
    let vect = optional_floats(batch, &[columns::VEC_X, columns::VEC_Y, columns::VEC_Z])?;
    let vect = vect
        .as_ref()
        .map(|v| {
            Ok::<_, ReaderError>([
                as_float32(&v[0], columns::VEC_X)?,
                as_float32(&v[1], columns::VEC_Y)?,
                as_float32(&v[2], columns::VEC_Z)?,
            ])
        })
        .transpose()?;
    let alpha = get_cast_column(batch, columns::ALPHA, &DataType::Float32)?;
    let alpha = alpha.as_ref().map(|a| as_float32(a, columns::ALPHA)).transpose()?;

    let mut records = Vec::with_capacity(groups.order.len());
    for (id, rows) in groups.iter() {
        let rows_usize: Vec<usize> = rows.iter().map(|&r| r as usize).collect();
        let points = rows_usize
            .iter()
            .map(|&row| [x.value(row), y.value(row), z.value(row)])
            .collect();
        let mut dotprops = Dotprops::new(id.clone(), points);

        // Vectors and alpha are per-record: present only when every row has them
        if let Some([vx, vy, vz]) = vect {
            if rows_usize.iter().all(|&r| vx.is_valid(r) && vy.is_valid(r) && vz.is_valid(r)) {
                dotprops = dotprops.with_vectors(
                    rows_usize
                        .iter()
                        .map(|&r| [vx.value(r), vy.value(r), vz.value(r)])
                        .collect(),
                );
            }
        }
        if let Some(alpha) = alpha {
            if rows_usize.iter().all(|&r| alpha.is_valid(r)) {
                dotprops = dotprops.with_alpha(rows_usize.iter().map(|&r| alpha.value(r)).collect());
            }
        }

        records.push(dotprops.with_extra(extra_columns(extras, rows)?).into());
    }
    Ok(records)
}

/// Regroup table rows into records.
///
/// Rows are grouped by the `neuron` column in order of first appearance and
/// keep their relative order within a record. Skeleton graphs are built
/// here only to check them: a table whose rows form a cycle or reference
/// missing parents is corrupt. The adjacency is not kept; callers rebuild
/// it on demand with [`Skeleton::graph`], which cannot fail for a record
/// returned from here.
pub(crate) fn assemble_records(batch: &RecordBatch, kind: NeuronKind, id_type: IdType) -> Result<Vec<Neuron>, ReaderError> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }
    let groups = RowGroups::from_ids(read_id_column(batch, columns::NEURON, id_type)?);

    let schema = batch.schema();
    let extras: Vec<(String, ArrayRef)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !columns::is_reserved_column(kind, f.name()))
        .map(|(i, f)| (f.name().clone(), batch.column(i).clone()))
        .collect();

    match kind {
        NeuronKind::Skeleton => assemble_skeletons(batch, &groups, &extras),
        NeuronKind::Dotprops => assemble_dotprops(batch, &groups, &extras),
    }
}
