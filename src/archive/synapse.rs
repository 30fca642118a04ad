use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float32Array, Int64Array, Int64Builder, StringArray, StringBuilder};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};

use crate::record::{IdType, RecordId};
use crate::schema::columns;

use super::{ArchiveError, SecondaryTable};

/// Column holding the connector id
pub const CONNECTOR_ID: &str = "connector_id";
/// Column holding the synapse side
pub const SYNAPSE_TYPE: &str = "type";

/// Side of a synapse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynapseKind {
    /// Presynaptic site
    Pre,
    /// Postsynaptic site
    Post,
}

impl SynapseKind {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SynapseKind::Pre => "pre",
            SynapseKind::Post => "post",
        }
    }

    /// Parse the stored representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pre" => Some(SynapseKind::Pre),
            "post" => Some(SynapseKind::Post),
            _ => None,
        }
    }
}

impl fmt::Display for SynapseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One synapse of a neuron
#[derive(Debug, Clone, PartialEq)]
pub struct Synapse {
    /// Owning record
    pub neuron: RecordId,
    /// Connector shared by the pre and post sites
    pub connector_id: Option<i64>,
    /// Skeleton node the synapse sits on
    pub node_id: Option<i64>,
    /// Pre or post
    pub kind: SynapseKind,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
}

fn synapse_schema(id_type: IdType) -> Schema {
    Schema::new(vec![
        Field::new(columns::NEURON, id_type.data_type(), false),
        Field::new(CONNECTOR_ID, DataType::Int64, true),
        Field::new(columns::NODE_ID, DataType::Int64, true),
        Field::new(SYNAPSE_TYPE, DataType::Utf8, false),
        Field::new(columns::X, DataType::Float32, false),
        Field::new(columns::Y, DataType::Float32, false),
        Field::new(columns::Z, DataType::Float32, false),
    ])
}

/// Build a secondary table from synapses.
///
/// All synapses must use the same id type; an empty list gives an empty
/// integer-keyed table.
pub fn synapse_table(name: impl Into<String>, synapses: &[Synapse]) -> Result<SecondaryTable, ArchiveError> {
    let id_type = synapses.first().map(|s| s.neuron.id_type()).unwrap_or(IdType::Int);
    if let Some(s) = synapses.iter().find(|s| s.neuron.id_type() != id_type) {
        return Err(ArchiveError::InvalidData(format!(
            "synapse of record {} uses {} ids, expected {}",
            s.neuron,
            s.neuron.id_type(),
            id_type
        )));
    }

    let neuron: ArrayRef = match id_type {
        IdType::Int => Arc::new(
            synapses
                .iter()
                .map(|s| match s.neuron {
                    RecordId::Int(v) => Some(v),
                    RecordId::Str(_) => None,
                })
                .collect::<Int64Array>(),
        ),
        IdType::Str => Arc::new(
            synapses
                .iter()
                .map(|s| Some(s.neuron.to_string()))
                .collect::<StringArray>(),
        ),
    };

    let mut connector = Int64Builder::with_capacity(synapses.len());
    let mut node = Int64Builder::with_capacity(synapses.len());
    let mut kind = StringBuilder::with_capacity(synapses.len(), synapses.len() * 4);
    for s in synapses {
        connector.append_option(s.connector_id);
        node.append_option(s.node_id);
        kind.append_value(s.kind.as_str());
    }

    let batch = RecordBatch::try_new(
        Arc::new(synapse_schema(id_type)),
        vec![
            neuron,
            Arc::new(connector.finish()),
            Arc::new(node.finish()),
            Arc::new(kind.finish()),
            Arc::new(Float32Array::from(synapses.iter().map(|s| s.x).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(synapses.iter().map(|s| s.y).collect::<Vec<_>>())),
            Arc::new(Float32Array::from(synapses.iter().map(|s| s.z).collect::<Vec<_>>())),
        ],
    )?;
    Ok(SecondaryTable::new(name, batch))
}

fn column(table: &SecondaryTable, name: &str, data_type: &DataType) -> Result<ArrayRef, ArchiveError> {
    let array = table
        .batch()
        .column_by_name(name)
        .ok_or_else(|| ArchiveError::InvalidData(format!("table '{}' has no column '{}'", table.name(), name)))?;
    Ok(cast(array, data_type)?)
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T, ArchiveError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ArchiveError::InvalidData(format!("column '{}' has an unexpected type", name)))
}

/// Decode synapses from a secondary table with the synapse columns.
pub fn read_synapses(table: &SecondaryTable) -> Result<Vec<Synapse>, ArchiveError> {
    let ids = table.ids()?;
    let connector = column(table, CONNECTOR_ID, &DataType::Int64)?;
    let node = column(table, columns::NODE_ID, &DataType::Int64)?;
    let kind = column(table, SYNAPSE_TYPE, &DataType::Utf8)?;
    let x = column(table, columns::X, &DataType::Float32)?;
    let y = column(table, columns::Y, &DataType::Float32)?;
    let z = column(table, columns::Z, &DataType::Float32)?;

    let connector = downcast::<Int64Array>(&connector, CONNECTOR_ID)?;
    let node = downcast::<Int64Array>(&node, columns::NODE_ID)?;
    let kind = downcast::<StringArray>(&kind, SYNAPSE_TYPE)?;
    let [x, y, z] = [
        downcast::<Float32Array>(&x, columns::X)?,
        downcast::<Float32Array>(&y, columns::Y)?,
        downcast::<Float32Array>(&z, columns::Z)?,
    ];

    ids.into_iter()
        .enumerate()
        .map(|(row, id)| {
            let neuron = id.ok_or_else(|| ArchiveError::InvalidData(format!("synapse row {} has no neuron", row)))?;
            let side = kind
                .is_valid(row)
                .then(|| SynapseKind::parse(kind.value(row)))
                .flatten()
                .ok_or_else(|| ArchiveError::InvalidData(format!("synapse row {} has no valid type", row)))?;
            Ok(Synapse {
                neuron,
                connector_id: connector.is_valid(row).then(|| connector.value(row)),
                node_id: node.is_valid(row).then(|| node.value(row)),
                kind: side,
                x: x.value(row),
                y: y.value(row),
                z: z.value(row),
            })
        })
        .collect()
}
