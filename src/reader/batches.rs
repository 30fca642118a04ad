use arrow::record_batch::RecordBatch;

use super::table::ScanPlan;
use super::{NeuronReader, ReaderError};

/// Streaming iterator over record batches of the primary table
pub struct RecordBatchIterator {
    inner: Box<dyn Iterator<Item = Result<RecordBatch, arrow::error::ArrowError>> + Send>,
}

impl RecordBatchIterator {
    pub(crate) fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<RecordBatch, arrow::error::ArrowError>> + Send + 'static,
    {
        Self { inner: Box::new(iter) }
    }
}

impl Iterator for RecordBatchIterator {
    type Item = Result<RecordBatch, ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|r| r.map_err(ReaderError::from))
    }
}

impl NeuronReader {
    /// Returns a streaming iterator over the raw rows of the primary table
    ///
    /// Memory usage is bounded by `batch_size * row_size`.
    ///
    /// # Example
    /// ```rust,no_run
    /// use morphpack::reader::NeuronReader;
    ///
    /// let reader = NeuronReader::open("collection.zip")?;
    /// for batch_result in reader.iter_batches()? {
    ///     let batch = batch_result?;
    ///     println!("Processing batch with {} rows", batch.num_rows());
    /// }
    /// # Ok::<(), morphpack::reader::ReaderError>(())
    /// ```
    pub fn iter_batches(&self) -> Result<RecordBatchIterator, ReaderError> {
        let plan = ScanPlan {
            batch_size: self.config.batch_size,
            ..ScanPlan::default()
        };
        Ok(RecordBatchIterator::new(self.table.scan(&plan)?))
    }

    /// Read all record batches of the primary table (eager)
    pub fn read_all_batches(&self) -> Result<Vec<RecordBatch>, ReaderError> {
        self.iter_batches()?.collect()
    }
}
