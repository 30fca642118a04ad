use std::sync::Arc;

use arrow::array::{new_null_array, Array, ArrayRef, Float32Builder, Int64Builder, StringBuilder};
use arrow::compute::concat;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::record::{Dotprops, IdType, Neuron, NeuronKind, RecordId, Skeleton};
use crate::schema::TableLayout;

use super::error::WriterError;

/// Build the `neuron` column: each record's id repeated once per row.
fn build_id_column(id_type: IdType, records: &[&Neuron], rows: usize) -> Result<ArrayRef, WriterError> {
    match id_type {
        IdType::Int => {
            let mut builder = Int64Builder::with_capacity(rows);
            for record in records {
                match record.id() {
                    RecordId::Int(v) => builder.append_slice(&vec![*v; record.row_count()]),
                    other => {
                        return Err(WriterError::InvalidData(format!(
                            "record id '{}' is not an integer",
                            other
                        )))
                    }
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        IdType::Str => {
            let mut builder = StringBuilder::with_capacity(rows, rows * 8);
            for record in records {
                let id = record.id().to_string();
                for _ in 0..record.row_count() {
                    builder.append_value(&id);
                }
            }
            Ok(Arc::new(builder.finish()))
        }
    }
}

fn skeletons<'a>(records: &'a [&'a Neuron]) -> Result<Vec<&'a Skeleton>, WriterError> {
    records
        .iter()
        .map(|r| {
            r.as_skeleton()
                .ok_or_else(|| WriterError::InvalidData(format!("record {} is not a skeleton", r.id())))
        })
        .collect()
}

fn dotprops<'a>(records: &'a [&'a Neuron]) -> Result<Vec<&'a Dotprops>, WriterError> {
    records
        .iter()
        .map(|r| {
            r.as_dotprops()
                .ok_or_else(|| WriterError::InvalidData(format!("record {} is not dotprops", r.id())))
        })
        .collect()
}

fn skeleton_columns(layout: &TableLayout, records: &[&Neuron], rows: usize) -> Result<Vec<ArrayRef>, WriterError> {
    let skeletons = skeletons(records)?;
    let mut node_id = Int64Builder::with_capacity(rows);
    let mut parent_id = Int64Builder::with_capacity(rows);
    let mut x = Float32Builder::with_capacity(rows);
    let mut y = Float32Builder::with_capacity(rows);
    let mut z = Float32Builder::with_capacity(rows);
    let mut radius = Float32Builder::with_capacity(rows);

    for node in skeletons.iter().flat_map(|s| s.nodes.iter()) {
        node_id.append_value(node.node_id);
        parent_id.append_value(node.stored_parent());
        x.append_value(node.x);
        y.append_value(node.y);
        z.append_value(node.z);
        radius.append_option(node.radius);
    }

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(node_id.finish()),
        Arc::new(parent_id.finish()),
        Arc::new(x.finish()),
        Arc::new(y.finish()),
        Arc::new(z.finish()),
    ];
    if layout.has_radius {
        columns.push(Arc::new(radius.finish()));
    }
    Ok(columns)
}

fn dotprops_columns(layout: &TableLayout, records: &[&Neuron], rows: usize) -> Result<Vec<ArrayRef>, WriterError> {
    let dotprops = dotprops(records)?;
    let mut coords = [
        Float32Builder::with_capacity(rows),
        Float32Builder::with_capacity(rows),
        Float32Builder::with_capacity(rows),
    ];
    let mut vect = [
        Float32Builder::with_capacity(rows),
        Float32Builder::with_capacity(rows),
        Float32Builder::with_capacity(rows),
    ];
    let mut alpha = Float32Builder::with_capacity(rows);

    for d in dotprops {
        for (i, point) in d.points.iter().enumerate() {
            for axis in 0..3 {
                coords[axis].append_value(point[axis]);
            }
            let v = d.vect.as_ref().and_then(|v| v.get(i));
            for axis in 0..3 {
                vect[axis].append_option(v.map(|v| v[axis]));
            }
            alpha.append_option(d.alpha.as_ref().and_then(|a| a.get(i).copied()));
        }
    }

    let mut columns: Vec<ArrayRef> = coords
        .iter_mut()
        .map(|b| Arc::new(b.finish()) as ArrayRef)
        .collect();
    if layout.has_vectors {
        columns.extend(vect.iter_mut().map(|b| Arc::new(b.finish()) as ArrayRef));
    }
    if layout.has_alpha {
        columns.push(Arc::new(alpha.finish()));
    }
    Ok(columns)
}

/// Build one pass-through column across records, padding records that lack
/// it with nulls.
fn extra_column(name: &str, field_type: &DataType, records: &[&Neuron]) -> Result<ArrayRef, WriterError> {
    let parts: Vec<ArrayRef> = records
        .iter()
        .map(|r| match r.extra().get(name) {
            Some(values) => values.clone(),
            None => new_null_array(field_type, r.row_count()),
        })
        .collect();
    let refs: Vec<&dyn Array> = parts.iter().map(|a| a.as_ref()).collect();
    Ok(concat(&refs)?)
}

/// Convert records into one Arrow batch laid out as `layout`.
///
/// Rows of each record stay contiguous and in their original order.
pub(crate) fn build_record_batch(
    layout: &TableLayout,
    schema: &SchemaRef,
    records: &[&Neuron],
) -> Result<RecordBatch, WriterError> {
    let rows: usize = records.iter().map(|r| r.row_count()).sum();

    let mut columns = match layout.kind {
        NeuronKind::Skeleton => skeleton_columns(layout, records, rows)?,
        NeuronKind::Dotprops => dotprops_columns(layout, records, rows)?,
    };
    columns.push(build_id_column(layout.id_type, records, rows)?);
    for field in &layout.extra_fields {
        columns.push(extra_column(field.name(), field.data_type(), records)?);
    }

    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}
