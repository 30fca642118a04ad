use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::Schema;
use serde::Serialize;

use crate::record::{IdType, NeuronKind};
use crate::schema::{
    columns, validate_table_schema, KEY_CREATED, KEY_FORMAT_VERSION, KEY_ID_TYPE, KEY_KIND,
    KEY_RECORD_COUNT, KEY_SORTED_BY_ID, KEY_TABLE_NAME, KEY_WRITER,
};

use super::table::ParquetTable;
use super::ReaderError;

/// Metadata extracted from the footer of a primary table
#[derive(Debug, Clone, Serialize)]
pub struct FileMetadata {
    /// Format version string, if the writer recorded one
    pub format_version: Option<String>,
    /// Name of the table stream
    pub table_name: Option<String>,
    /// Record kind stored in the table
    pub kind: NeuronKind,
    /// Type of the `neuron` column
    pub id_type: IdType,
    /// Number of records declared by the writer
    pub record_count: Option<usize>,
    /// Whether the writer grouped rows by sorted id
    pub sorted_by_id: bool,
    /// Total number of rows in the table
    pub total_rows: i64,
    /// Number of row groups
    pub num_row_groups: usize,
    /// Creation timestamp (RFC 3339)
    pub created: Option<String>,
    /// Writer name and version
    pub writer: Option<String>,
    /// Arrow schema of the table
    #[serde(skip)]
    pub schema: Arc<Schema>,
    /// Raw footer key/value pairs in stored order
    pub key_value_metadata: Vec<(String, String)>,
}

impl FileMetadata {
    /// Extract metadata from a loaded table.
    ///
    /// The record kind comes from the footer when present and is otherwise
    /// inferred from the columns. The column contract is checked here, so a
    /// table missing a required column never gets past opening.
    pub(crate) fn from_table(table: &ParquetTable) -> Result<Self, ReaderError> {
        let schema = table.schema().clone();
        let key_value_metadata = table.key_values();
        let kv: HashMap<&str, &str> = key_value_metadata
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let kind = match kv.get(KEY_KIND) {
            Some(value) => NeuronKind::parse(value).ok_or_else(|| {
                ReaderError::CorruptTable(format!("unknown record kind '{}'", value))
            })?,
            None => infer_kind(&schema),
        };

        let id_type = validate_table_schema(&schema, kind)
            .map_err(|e| ReaderError::CorruptTable(e.to_string()))?;
        if let Some(declared) = kv.get(KEY_ID_TYPE).and_then(|v| IdType::parse(v)) {
            if declared != id_type {
                log::warn!(
                    "Footer declares {} ids but the neuron column holds {} ids; using the column type",
                    declared,
                    id_type
                );
            }
        }

        let parquet_metadata = table.parquet_metadata();
        let total_rows = parquet_metadata.row_groups().iter().map(|rg| rg.num_rows()).sum();
        let owned = |key: &str| kv.get(key).map(|v| v.to_string());

        Ok(Self {
            format_version: owned(KEY_FORMAT_VERSION),
            table_name: owned(KEY_TABLE_NAME),
            kind,
            id_type,
            record_count: kv.get(KEY_RECORD_COUNT).and_then(|v| v.parse().ok()),
            sorted_by_id: kv.get(KEY_SORTED_BY_ID).map(|v| *v == "true").unwrap_or(false),
            total_rows,
            num_row_groups: parquet_metadata.num_row_groups(),
            created: owned(KEY_CREATED),
            writer: owned(KEY_WRITER),
            schema,
            key_value_metadata,
        })
    }

    /// Columns beyond the required and optional ones for this kind
    pub fn extra_columns(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .filter(|name| !columns::is_reserved_column(self.kind, name))
            .collect()
    }
}

/// Tables without a kind key are skeletons when they carry the tree columns.
fn infer_kind(schema: &Schema) -> NeuronKind {
    let has = |name: &str| schema.field_with_name(name).is_ok();
    if has(columns::NODE_ID) && has(columns::PARENT_ID) {
        NeuronKind::Skeleton
    } else {
        NeuronKind::Dotprops
    }
}
