use std::collections::HashSet;

use arrow::array::{Array, BooleanArray, Int64Array, StringArray};
use arrow::compute::{cast, filter_record_batch};
use arrow::record_batch::RecordBatch;

use crate::record::{IdType, RecordId};
use crate::schema::{columns, DEFAULT_PRIMARY_TABLE, TABLE_EXTENSION};

use super::ArchiveError;

/// A relational table stored next to the primary table.
///
/// Rows reference primary records through a foreign-key column, `neuron`
/// unless configured otherwise. The table is otherwise opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondaryTable {
    name: String,
    id_column: String,
    batch: RecordBatch,
}

impl SecondaryTable {
    /// Create a table keyed by the `neuron` column
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            id_column: columns::NEURON.to_string(),
            batch,
        }
    }

    /// Use another column as the foreign key
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Table name (the archive entry without extension)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Foreign-key column name
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Table contents
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Archive entry name
    pub fn entry_name(&self) -> String {
        format!("{}{}", self.name, TABLE_EXTENSION)
    }

    /// Check that the name is usable as a standalone archive entry
    pub fn validate_name(&self) -> Result<(), ArchiveError> {
        let name = self.name.as_str();
        if name.is_empty()
            || name == DEFAULT_PRIMARY_TABLE
            || name.ends_with(TABLE_EXTENSION)
            || name.contains(['/', '\\'])
            || name.starts_with('.')
        {
            return Err(ArchiveError::InvalidTableName(self.name.clone()));
        }
        Ok(())
    }

    /// Id type of the foreign-key column
    pub fn id_type(&self) -> Result<IdType, ArchiveError> {
        let field = self
            .batch
            .schema_ref()
            .field_with_name(&self.id_column)
            .map_err(|_| ArchiveError::MissingIdColumn {
                table: self.name.clone(),
                column: self.id_column.clone(),
            })?
            .clone();
        IdType::from_data_type(field.data_type()).ok_or_else(|| ArchiveError::IdColumnType {
            table: self.name.clone(),
            column: self.id_column.clone(),
            found: field.data_type().clone(),
        })
    }

    /// Foreign key of every row; `None` for null keys
    pub fn ids(&self) -> Result<Vec<Option<RecordId>>, ArchiveError> {
        let id_type = self.id_type()?;
        let column = self
            .batch
            .column_by_name(&self.id_column)
            .ok_or_else(|| ArchiveError::MissingIdColumn {
                table: self.name.clone(),
                column: self.id_column.clone(),
            })?;
        let column = cast(column, &id_type.data_type())?;
        let ids = match id_type {
            IdType::Int => column
                .as_any()
                .downcast_ref::<Int64Array>()
                .map(|a| a.iter().map(|v| v.map(RecordId::Int)).collect()),
            IdType::Str => column
                .as_any()
                .downcast_ref::<StringArray>()
                .map(|a| a.iter().map(|v| v.map(|s| RecordId::Str(s.to_string()))).collect()),
        };
        ids.ok_or_else(|| ArchiveError::InvalidData(format!("cannot decode id column of '{}'", self.name)))
    }

    /// Rows whose foreign key is in `keep`. Rows with null keys are dropped.
    ///
    /// Ids are compared after conversion to the column's id type.
    pub fn filter(&self, keep: &HashSet<RecordId>) -> Result<Self, ArchiveError> {
        let id_type = self.id_type()?;
        let keep: HashSet<RecordId> = keep.iter().filter_map(|id| id.coerce(id_type)).collect();
        let mask: BooleanArray = self
            .ids()?
            .into_iter()
            .map(|id| Some(id.is_some_and(|id| keep.contains(&id))))
            .collect();
        Ok(Self {
            name: self.name.clone(),
            id_column: self.id_column.clone(),
            batch: filter_record_batch(&self.batch, &mask)?,
        })
    }
}
