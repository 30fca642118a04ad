use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema, SchemaBuilder, SchemaRef};

use super::columns;
use crate::record::{IdType, NeuronKind};

/// Shape of a primary table, derived from the records it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayout {
    /// Record kind
    pub kind: NeuronKind,
    /// Type of the `neuron` column
    pub id_type: IdType,
    /// Whether any skeleton node carries a radius
    pub has_radius: bool,
    /// Whether any dotprops carry tangent vectors
    pub has_vectors: bool,
    /// Whether any dotprops carry alpha values
    pub has_alpha: bool,
    /// Pass-through columns in first-seen order (always nullable)
    pub extra_fields: Vec<Field>,
}

impl TableLayout {
    /// Layout with only the required columns
    pub fn new(kind: NeuronKind, id_type: IdType) -> Self {
        Self {
            kind,
            id_type,
            has_radius: false,
            has_vectors: false,
            has_alpha: false,
            extra_fields: Vec::new(),
        }
    }

    /// Arrow schema for this layout
    pub fn schema(&self) -> Schema {
        create_table_schema(self)
    }

    /// Arrow schema for this layout, wrapped in an `Arc`
    pub fn schema_ref(&self) -> SchemaRef {
        Arc::new(self.schema())
    }
}

/// Creates a Field with a human-readable description annotation
fn field_with_description(name: &str, data_type: DataType, nullable: bool, description: &str) -> Field {
    let mut metadata = HashMap::new();
    metadata.insert("description".to_string(), description.to_string());
    Field::new(name, data_type, nullable).with_metadata(metadata)
}

fn coordinate_fields(builder: &mut SchemaBuilder) {
    builder.push(field_with_description(columns::X, DataType::Float32, false, "x coordinate"));
    builder.push(field_with_description(columns::Y, DataType::Float32, false, "y coordinate"));
    builder.push(field_with_description(columns::Z, DataType::Float32, false, "z coordinate"));
}

/// Creates the Arrow schema of a primary table.
///
/// Skeleton tables store `node_id, parent_id, x, y, z[, radius], neuron`;
/// dotprops tables store `x, y, z[, vec_x, vec_y, vec_z][, alpha], neuron`.
/// Pass-through columns follow the reserved ones.
///
/// # Example
///
/// ```
/// use morphpack::record::{IdType, NeuronKind};
/// use morphpack::schema::{create_table_schema, TableLayout};
///
/// let schema = create_table_schema(&TableLayout::new(NeuronKind::Skeleton, IdType::Int));
/// assert_eq!(schema.fields().len(), 6);
/// ```
pub fn create_table_schema(layout: &TableLayout) -> Schema {
    let mut builder = SchemaBuilder::new();

    match layout.kind {
        NeuronKind::Skeleton => {
            builder.push(field_with_description(
                columns::NODE_ID,
                DataType::Int64,
                false,
                "node identifier, unique per neuron",
            ));
            builder.push(field_with_description(
                columns::PARENT_ID,
                DataType::Int64,
                false,
                "parent node identifier, -1 for roots",
            ));
            coordinate_fields(&mut builder);
            if layout.has_radius {
                builder.push(field_with_description(columns::RADIUS, DataType::Float32, true, "node radius"));
            }
        }
        NeuronKind::Dotprops => {
            coordinate_fields(&mut builder);
            if layout.has_vectors {
                for name in [columns::VEC_X, columns::VEC_Y, columns::VEC_Z] {
                    builder.push(field_with_description(name, DataType::Float32, true, "tangent vector component"));
                }
            }
            if layout.has_alpha {
                builder.push(field_with_description(columns::ALPHA, DataType::Float32, true, "alpha (linearity)"));
            }
        }
    }

    builder.push(field_with_description(
        columns::NEURON,
        layout.id_type.data_type(),
        false,
        "record identifier",
    ));

    for field in &layout.extra_fields {
        builder.push(field.clone());
    }

    builder.finish()
}
