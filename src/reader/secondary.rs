use std::collections::HashSet;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;

use crate::archive::SecondaryTable;
use crate::record::RecordId;
use crate::schema::{columns, KEY_ID_COLUMN, TABLE_EXTENSION};

use super::table::{ParquetTable, ScanPlan};
use super::{NeuronReader, ReaderError};

impl NeuronReader {
    /// Names of the secondary tables in the container
    ///
    /// Bare tables have none. Secondary tables are only opened on request.
    pub fn secondary_names(&self) -> Vec<String> {
        self.secondary_entries
            .iter()
            .map(|entry| entry.strip_suffix(TABLE_EXTENSION).unwrap_or(entry).to_string())
            .collect()
    }

    /// Read a whole secondary table by name
    pub fn read_secondary(&self, name: &str) -> Result<SecondaryTable, ReaderError> {
        let table = ParquetTable::open(self.table_source(name)?)?;
        let id_column = table
            .key_value_map()
            .remove(KEY_ID_COLUMN)
            .unwrap_or_else(|| columns::NEURON.to_string());

        let plan = ScanPlan {
            batch_size: self.config.batch_size,
            ..ScanPlan::default()
        };
        let batches: Vec<RecordBatch> = table.scan(&plan)?.collect::<Result<_, _>>()?;
        let batch = concat_batches(table.schema(), &batches)?;
        // Footer keys belong to the container, not to the table
        let schema = Arc::new(Schema::new(batch.schema().fields().clone()));
        let batch = RecordBatch::try_new(schema, batch.columns().to_vec())?;

        let name = name.strip_suffix(TABLE_EXTENSION).unwrap_or(name);
        let secondary = SecondaryTable::new(name, batch).with_id_column(id_column);
        secondary
            .id_type()
            .map_err(|e| ReaderError::CorruptTable(e.to_string()))?;
        Ok(secondary)
    }

    /// Read the rows of a secondary table that reference `ids`
    pub fn read_secondary_for(&self, name: &str, ids: &HashSet<RecordId>) -> Result<SecondaryTable, ReaderError> {
        self.read_secondary(name)?
            .filter(ids)
            .map_err(|e| ReaderError::CorruptTable(e.to_string()))
    }
}
