use std::collections::{BTreeSet, HashMap, HashSet};

use arrow::compute::{concat_batches, filter_record_batch};
use arrow::record_batch::RecordBatch;
use log::debug;

use crate::metadata::{DecodedMetadata, RecordMetadata};
use crate::record::{Neuron, RecordId};
use crate::schema::columns;

use super::pruning::{id_range, select_row_groups, RowGroupSelection};
use super::table::ScanPlan;
use super::unpack::assemble_records;
use super::utils::{id_mask, read_id_column};
use super::{NeuronReader, ReaderError};

/// Result of a read by id list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOutcome {
    /// Records found, in the order they were requested
    pub records: Vec<Neuron>,
    /// Requested ids that matched no rows
    pub missing: Vec<RecordId>,
}

impl NeuronReader {
    fn plan(&self) -> ScanPlan {
        ScanPlan {
            batch_size: self.config.batch_size,
            ..ScanPlan::default()
        }
    }

    fn concat(&self, batches: &[RecordBatch]) -> Result<RecordBatch, ReaderError> {
        Ok(concat_batches(self.table.schema(), batches)?)
    }

    /// Read every record of the primary table, in table order
    pub fn read_all(&self) -> Result<Vec<Neuron>, ReaderError> {
        let batches = self.read_all_batches()?;
        let batch = self.concat(&batches)?;
        assemble_records(&batch, self.kind(), self.id_type())
    }

    /// Distinct record ids in table order.
    ///
    /// Only the `neuron` column is read.
    pub fn ids(&self) -> Result<Vec<RecordId>, ReaderError> {
        let plan = ScanPlan {
            columns: Some(vec![columns::NEURON.to_string()]),
            ..self.plan()
        };
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for batch in self.table.scan(&plan)? {
            for id in read_id_column(&batch?, columns::NEURON, self.id_type())? {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    fn id_column_index(&self) -> Result<usize, ReaderError> {
        self.table
            .column_index(columns::NEURON)
            .ok_or_else(|| ReaderError::ColumnNotFound(columns::NEURON.to_string()))
    }

    /// Row groups that a read of `ids` would scan
    pub fn plan_row_groups(&self, ids: &[RecordId]) -> Result<RowGroupSelection, ReaderError> {
        let wanted: BTreeSet<RecordId> = ids.iter().filter_map(|id| id.coerce(self.id_type())).collect();
        let id_column = self.id_column_index()?;
        Ok(select_row_groups(
            self.table.parquet_metadata(),
            id_column,
            self.id_type(),
            &wanted,
        ))
    }

    /// `neuron` id range of every row group, `None` where the statistics
    /// are missing or unusable
    pub fn row_group_id_ranges(&self) -> Result<Vec<Option<(RecordId, RecordId)>>, ReaderError> {
        let id_column = self.id_column_index()?;
        Ok(self
            .table
            .parquet_metadata()
            .row_groups()
            .iter()
            .map(|row_group| id_range(row_group, id_column, self.id_type()))
            .collect())
    }

    /// Read the records with the given ids.
    ///
    /// Never fails because an id is absent: unresolved ids, including ids
    /// that cannot be expressed in the table's id type, are returned in
    /// [`ReadOutcome::missing`]. Duplicate requests yield one record.
    pub fn read_ids(&self, ids: &[RecordId]) -> Result<ReadOutcome, ReaderError> {
        let id_type = self.id_type();
        let wanted: HashSet<RecordId> = ids.iter().filter_map(|id| id.coerce(id_type)).collect();

        let mut found: HashMap<RecordId, Neuron> = HashMap::new();
        if !wanted.is_empty() {
            let selection = self.plan_row_groups(ids)?;
            let plan = ScanPlan {
                row_groups: Some(selection.selected),
                ..self.plan()
            };

            let mut parts = Vec::new();
            for batch in self.table.scan(&plan)? {
                let batch = batch?;
                let mask = id_mask(&batch, columns::NEURON, id_type, &wanted)?;
                let filtered = filter_record_batch(&batch, &mask)?;
                if filtered.num_rows() > 0 {
                    parts.push(filtered);
                }
            }
            let batch = self.concat(&parts)?;
            debug!("Matched {} rows for {} requested ids", batch.num_rows(), wanted.len());

            found = assemble_records(&batch, self.kind(), id_type)?
                .into_iter()
                .map(|record| (record.id().clone(), record))
                .collect();
        }

        let mut outcome = ReadOutcome::default();
        let mut seen = HashSet::new();
        for requested in ids {
            let Some(id) = requested.coerce(id_type) else {
                if !outcome.missing.contains(requested) {
                    outcome.missing.push(requested.clone());
                }
                continue;
            };
            if !seen.insert(id.clone()) {
                continue;
            }
            match found.remove(&id) {
                Some(record) => outcome.records.push(record),
                None => outcome.missing.push(requested.clone()),
            }
        }
        Ok(outcome)
    }

    /// Read one record, failing with [`ReaderError::RecordNotFound`] if it
    /// has no rows.
    pub fn get(&self, id: &RecordId) -> Result<Neuron, ReaderError> {
        self.read_ids(std::slice::from_ref(id))?
            .records
            .pop()
            .ok_or_else(|| ReaderError::RecordNotFound(vec![id.clone()]))
    }

    /// Decode the record metadata stored in the primary footer.
    ///
    /// With `known`, entries for records outside the set are flagged.
    pub fn record_metadata(&self, known: Option<&HashSet<RecordId>>) -> DecodedMetadata {
        RecordMetadata::from_key_values(
            self.file_metadata
                .key_value_metadata
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
            self.id_type(),
            known,
        )
    }
}
