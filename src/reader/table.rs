use std::collections::HashMap;
use std::fs::File;
use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use parquet::arrow::arrow_reader::{
    ArrowReaderMetadata, ArrowReaderOptions, ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder,
};
use parquet::arrow::ProjectionMask;
use parquet::file::metadata::ParquetMetaData;
use parquet::file::reader::ChunkReader;

use super::config::TableSource;
use super::ReaderError;

/// Which part of a table to scan
#[derive(Debug, Clone, Default)]
pub(crate) struct ScanPlan {
    /// Row groups to read, all when `None`
    pub row_groups: Option<Vec<usize>>,
    /// Columns to read by name, all when `None`
    pub columns: Option<Vec<String>>,
    /// Rows per batch
    pub batch_size: usize,
}

/// One Parquet table with its footer loaded once.
#[derive(Debug, Clone)]
pub(crate) struct ParquetTable {
    source: TableSource,
    metadata: ArrowReaderMetadata,
}

impl ParquetTable {
    /// Load the footer of a table
    pub(crate) fn open(source: TableSource) -> Result<Self, ReaderError> {
        let options = ArrowReaderOptions::new();
        let metadata = match &source {
            TableSource::File(path) => ArrowReaderMetadata::load(&File::open(path)?, options)?,
            TableSource::ZipEntry(reader) => ArrowReaderMetadata::load(reader, options)?,
            TableSource::Memory(bytes) => ArrowReaderMetadata::load(bytes, options)?,
        };
        Ok(Self { source, metadata })
    }

    /// Arrow schema of the table
    pub(crate) fn schema(&self) -> &SchemaRef {
        self.metadata.schema()
    }

    /// Parquet footer metadata
    pub(crate) fn parquet_metadata(&self) -> &Arc<ParquetMetaData> {
        self.metadata.metadata()
    }

    /// Footer key/value pairs in stored order
    pub(crate) fn key_values(&self) -> Vec<(String, String)> {
        self.parquet_metadata()
            .file_metadata()
            .key_value_metadata()
            .map(|kv| {
                kv.iter()
                    .filter_map(|e| e.value.as_ref().map(|v| (e.key.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Footer key/value pairs as a map (last value wins)
    pub(crate) fn key_value_map(&self) -> HashMap<String, String> {
        self.key_values().into_iter().collect()
    }

    /// Leaf column index of a top-level column
    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.parquet_metadata()
            .file_metadata()
            .schema_descr()
            .columns()
            .iter()
            .position(|c| c.path().parts().len() == 1 && c.name() == name)
    }

    /// Start a scan over this table
    pub(crate) fn scan(&self, plan: &ScanPlan) -> Result<ParquetRecordBatchReader, ReaderError> {
        match &self.source {
            TableSource::File(path) => self.build(File::open(path)?, plan),
            TableSource::ZipEntry(reader) => self.build(reader.clone(), plan),
            TableSource::Memory(bytes) => self.build(bytes.clone(), plan),
        }
    }

    fn build<T: ChunkReader + 'static>(
        &self,
        input: T,
        plan: &ScanPlan,
    ) -> Result<ParquetRecordBatchReader, ReaderError> {
        let mut builder = ParquetRecordBatchReaderBuilder::new_with_metadata(input, self.metadata.clone())
            .with_batch_size(plan.batch_size.max(1));

        if let Some(row_groups) = &plan.row_groups {
            builder = builder.with_row_groups(row_groups.clone());
        }
        if let Some(columns) = &plan.columns {
            let indices = columns
                .iter()
                .map(|name| {
                    self.column_index(name)
                        .ok_or_else(|| ReaderError::ColumnNotFound(name.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let mask = ProjectionMask::leaves(builder.parquet_schema(), indices);
            builder = builder.with_projection(mask);
        }

        Ok(builder.build()?)
    }
}
