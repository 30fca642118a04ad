use std::collections::{BTreeSet, HashSet};
use std::fmt;

use arrow::datatypes::{DataType, Field, Schema};

use super::builders::TableLayout;
use super::columns;
use crate::record::{GraphError, IdType, Neuron, NeuronKind, RecordId};

/// What is wrong with a record or a table schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Record kind differs from the collection kind
    KindMismatch {
        /// Kind of the collection
        expected: NeuronKind,
        /// Kind of the record
        found: NeuronKind,
    },
    /// Record id type differs from the collection's id type
    IdTypeMismatch {
        /// Id type declared by the first record
        expected: IdType,
        /// Id type of this record
        found: IdType,
    },
    /// Two records share an identifier
    DuplicateRecordId,
    /// Record without rows, which cannot be represented in a table
    EmptyRecord,
    /// Skeleton forest invariant broken
    Graph(GraphError),
    /// Per-row column length does not match the record's row count
    LengthMismatch {
        /// Column name
        column: String,
        /// Row count of the record
        expected: usize,
        /// Length of the column
        found: usize,
    },
    /// Pass-through column uses a reserved name
    ReservedColumn(String),
    /// Pass-through column type differs between records
    ExtraColumnType {
        /// Column name
        column: String,
        /// Type first seen for the column
        expected: DataType,
        /// Conflicting type
        found: DataType,
    },
    /// Required table column absent
    MissingColumn(String),
    /// Table column has an unusable type
    ColumnType {
        /// Column name
        column: String,
        /// Actual data type
        found: DataType,
    },
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::KindMismatch { expected, found } => {
                write!(f, "expected a {} record, found {}", expected, found)
            }
            ViolationKind::IdTypeMismatch { expected, found } => {
                write!(f, "id type {} differs from collection id type {}", found, expected)
            }
            ViolationKind::DuplicateRecordId => write!(f, "duplicate record id"),
            ViolationKind::EmptyRecord => write!(f, "record has no rows"),
            ViolationKind::Graph(e) => write!(f, "{}", e),
            ViolationKind::LengthMismatch { column, expected, found } => {
                write!(f, "column '{}' has {} values, expected {}", column, found, expected)
            }
            ViolationKind::ReservedColumn(name) => write!(f, "extra column '{}' uses a reserved name", name),
            ViolationKind::ExtraColumnType { column, expected, found } => write!(
                f,
                "extra column '{}' has type {:?}, other records use {:?}",
                column, found, expected
            ),
            ViolationKind::MissingColumn(name) => write!(f, "missing required column '{}'", name),
            ViolationKind::ColumnType { column, found } => {
                write!(f, "column '{}' has unsupported type {:?}", column, found)
            }
        }
    }
}

/// A single violation, attributed to a record when one is responsible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Offending record, `None` for table-level problems
    pub record: Option<RecordId>,
    /// What went wrong
    pub kind: ViolationKind,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.record {
            Some(id) => write!(f, "record {}: {}", id, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// Records or tables that break the schema rules.
///
/// Validation never stops at the first problem; `violations` lists all of
/// them so every offending record id is reported at once.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("schema validation failed: {}", summarize(.violations))]
pub struct SchemaError {
    /// Every violation found
    pub violations: Vec<SchemaViolation>,
}

fn summarize(violations: &[SchemaViolation]) -> String {
    violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}

impl SchemaError {
    /// Distinct offending record ids, sorted
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.violations
            .iter()
            .filter_map(|v| v.record.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

struct Collector {
    violations: Vec<SchemaViolation>,
}

impl Collector {
    fn record(&mut self, id: &RecordId, kind: ViolationKind) {
        self.violations.push(SchemaViolation {
            record: Some(id.clone()),
            kind,
        });
    }

    fn table(&mut self, kind: ViolationKind) {
        self.violations.push(SchemaViolation { record: None, kind });
    }

    fn finish<T>(self, value: T) -> Result<T, SchemaError> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(SchemaError {
                violations: self.violations,
            })
        }
    }
}

/// Validate records before they are packed into a table of `kind`.
///
/// Checks kind and id type consistency, id uniqueness, the skeleton forest
/// invariants, per-row column lengths and pass-through column types. On
/// success returns the [`TableLayout`] the records will be written with.
pub fn validate_records(kind: NeuronKind, records: &[Neuron]) -> Result<TableLayout, SchemaError> {
    let mut collector = Collector { violations: Vec::new() };
    let id_type = records.first().map(|r| r.id().id_type()).unwrap_or(IdType::Int);
    let mut layout = TableLayout::new(kind, id_type);
    let mut seen_ids = HashSet::with_capacity(records.len());

    for record in records {
        let id = record.id();
        if record.kind() != kind {
            collector.record(
                id,
                ViolationKind::KindMismatch {
                    expected: kind,
                    found: record.kind(),
                },
            );
        }
        if id.id_type() != id_type {
            collector.record(
                id,
                ViolationKind::IdTypeMismatch {
                    expected: id_type,
                    found: id.id_type(),
                },
            );
        }
        if !seen_ids.insert(id.clone()) {
            collector.record(id, ViolationKind::DuplicateRecordId);
        }
        if record.row_count() == 0 {
            collector.record(id, ViolationKind::EmptyRecord);
        }

        match record {
            Neuron::Skeleton(skeleton) => {
                if let Err(errors) = skeleton.graph() {
                    for error in errors {
                        collector.record(id, ViolationKind::Graph(error));
                    }
                }
                layout.has_radius |= skeleton.nodes.iter().any(|n| n.radius.is_some());
            }
            Neuron::Dotprops(dotprops) => {
                let n = dotprops.len();
                if let Some(vect) = &dotprops.vect {
                    if vect.len() != n {
                        collector.record(id, length_mismatch("vect", n, vect.len()));
                    }
                    layout.has_vectors = true;
                }
                if let Some(alpha) = &dotprops.alpha {
                    if alpha.len() != n {
                        collector.record(id, length_mismatch(columns::ALPHA, n, alpha.len()));
                    }
                    layout.has_alpha = true;
                }
            }
        }

        for (name, values) in record.extra().iter() {
            if columns::is_reserved_column(kind, name) {
                collector.record(id, ViolationKind::ReservedColumn(name.to_string()));
                continue;
            }
            if values.len() != record.row_count() {
                collector.record(id, length_mismatch(name, record.row_count(), values.len()));
            }
            match layout.extra_fields.iter().find(|f| f.name() == name) {
                Some(field) if field.data_type() != values.data_type() => collector.record(
                    id,
                    ViolationKind::ExtraColumnType {
                        column: name.to_string(),
                        expected: field.data_type().clone(),
                        found: values.data_type().clone(),
                    },
                ),
                Some(_) => {}
                None => layout
                    .extra_fields
                    .push(Field::new(name, values.data_type().clone(), true)),
            }
        }
    }

    collector.finish(layout)
}

fn length_mismatch(column: &str, expected: usize, found: usize) -> ViolationKind {
    ViolationKind::LengthMismatch {
        column: column.to_string(),
        expected,
        found,
    }
}

fn is_numeric(data_type: &DataType) -> bool {
    data_type.is_integer() || data_type.is_floating()
}

/// Check that a stored table schema satisfies the column contract for `kind`.
///
/// Returns the id type of the `neuron` column. Coordinate columns may use any
/// numeric type and identifier-like columns any integer type; readers cast
/// them on the way in.
pub fn validate_table_schema(schema: &Schema, kind: NeuronKind) -> Result<IdType, SchemaError> {
    let mut collector = Collector { violations: Vec::new() };
    let mut id_type = IdType::Int;

    for name in columns::required_columns(kind) {
        let field = match schema.field_with_name(name) {
            Ok(field) => field,
            Err(_) => {
                collector.table(ViolationKind::MissingColumn(name.to_string()));
                continue;
            }
        };
        let data_type = field.data_type();
        let usable = match *name {
            columns::NEURON => match IdType::from_data_type(data_type) {
                Some(t) => {
                    id_type = t;
                    true
                }
                None => false,
            },
            columns::NODE_ID | columns::PARENT_ID => data_type.is_integer(),
            _ => is_numeric(data_type),
        };
        if !usable {
            collector.table(ViolationKind::ColumnType {
                column: name.to_string(),
                found: data_type.clone(),
            });
        }
    }

    collector.finish(id_type)
}
