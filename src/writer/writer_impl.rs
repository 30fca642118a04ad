use std::fs::File;
use std::io::Write;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;

use crate::record::Neuron;
use crate::schema::{columns, TableLayout};

use super::batch::build_record_batch;
use super::config::WriterConfig;
use super::error::WriterError;
use super::stats::WriterStats;

/// Streaming writer for primary neuron tables.
///
/// Records are appended in the order given. Row groups are closed at record
/// boundaries once the configured target is reached, which keeps the
/// `neuron` range of each row group narrow when the input is grouped by id.
pub struct NeuronTableWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    layout: TableLayout,
    schema: SchemaRef,
    row_group_size: usize,
    pending_rows: usize,
    records_written: usize,
    rows_written: usize,
}

impl NeuronTableWriter<File> {
    /// Create a new writer to a file path
    pub fn new_file<P: AsRef<Path>>(
        path: P,
        layout: TableLayout,
        config: &WriterConfig,
        footer: &[(String, String)],
    ) -> Result<Self, WriterError> {
        let file = File::create(path)?;
        Self::new(file, layout, config, footer)
    }
}

impl<W: Write + Send> NeuronTableWriter<W> {
    /// Create a new writer to any Write implementation.
    ///
    /// `footer` holds the key/value pairs stored in the Parquet footer.
    pub fn new(
        sink: W,
        layout: TableLayout,
        config: &WriterConfig,
        footer: &[(String, String)],
    ) -> Result<Self, WriterError> {
        let schema = layout.schema_ref();
        let props = config.to_writer_properties(&schema, columns::NEURON, footer);
        let writer = ArrowWriter::try_new(sink, schema.clone(), Some(props))?;

        Ok(Self {
            writer,
            layout,
            schema,
            row_group_size: config.row_group_size.max(1),
            pending_rows: 0,
            records_written: 0,
            rows_written: 0,
        })
    }

    /// Arrow schema of the table being written
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Append records, closing row groups at record boundaries.
    pub fn write_records(&mut self, records: &[&Neuron]) -> Result<(), WriterError> {
        let mut group: Vec<&Neuron> = Vec::new();
        let mut group_rows = 0usize;

        for record in records {
            let rows = record.row_count();
            if self.pending_rows + group_rows > 0 && self.pending_rows + group_rows + rows > self.row_group_size {
                self.write_group(&group, group_rows)?;
                self.close_row_group()?;
                group.clear();
                group_rows = 0;
            }
            group.push(record);
            group_rows += rows;
        }

        self.write_group(&group, group_rows)
    }

    /// Append a single record
    pub fn write_record(&mut self, record: &Neuron) -> Result<(), WriterError> {
        self.write_records(&[record])
    }

    fn write_group(&mut self, group: &[&Neuron], rows: usize) -> Result<(), WriterError> {
        if group.is_empty() {
            return Ok(());
        }
        let batch: RecordBatch = build_record_batch(&self.layout, &self.schema, group)?;
        self.writer.write(&batch)?;
        self.pending_rows += rows;
        self.records_written += group.len();
        self.rows_written += rows;
        Ok(())
    }

    fn close_row_group(&mut self) -> Result<(), WriterError> {
        if self.pending_rows > 0 {
            debug!("Closing row group with {} rows", self.pending_rows);
            self.writer.flush()?;
            self.pending_rows = 0;
        }
        Ok(())
    }

    /// Get current statistics
    pub fn stats(&self) -> WriterStats {
        WriterStats {
            records_written: self.records_written,
            rows_written: self.rows_written,
            row_groups_written: self.writer.flushed_row_groups().len(),
            file_size_bytes: 0,
        }
    }

    /// Finish writing and return the underlying sink with final statistics.
    ///
    /// `file_size_bytes` is left at zero since a generic sink cannot report
    /// its length; callers that know it fill it in.
    pub fn finish(mut self) -> Result<(W, WriterStats), WriterError> {
        self.close_row_group()?;
        let stats = self.stats();
        let sink = self.writer.into_inner()?;
        Ok((sink, stats))
    }
}
