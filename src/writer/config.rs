use arrow::datatypes::{DataType, Field, Schema};
use parquet::basic::{Compression, Encoding, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use parquet::schema::types::ColumnPath;

use crate::schema::{columns, DEFAULT_PRIMARY_TABLE};

/// Compression options for table streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// ZSTD at the given level (1-22)
    Zstd(i32),
    /// Snappy
    Snappy,
    /// Plain pages
    Uncompressed,
}

impl Default for CompressionType {
    fn default() -> Self {
        Self::Zstd(9)
    }
}

impl CompressionType {
    /// Parquet codec for this setting; out-of-range ZSTD levels fall back to the codec default
    fn codec(self) -> Compression {
        match self {
            Self::Zstd(level) => Compression::ZSTD(ZstdLevel::try_new(level).unwrap_or_default()),
            Self::Snappy => Compression::SNAPPY,
            Self::Uncompressed => Compression::UNCOMPRESSED,
        }
    }
}

/// Container layout to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerFormat {
    /// Bare Parquet file when there are no secondary tables, archive otherwise
    #[default]
    Auto,
    /// Single Parquet file holding only the primary table
    Bare,
    /// ZIP archive with the primary table and any secondary tables
    Archive,
}

/// Configuration for packing neuron tables
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression type to use
    pub compression: CompressionType,

    /// Target rows per row group. Row groups are closed at record
    /// boundaries once this many rows are buffered, so a record never
    /// straddles two groups unless it alone exceeds `max_row_group_size`.
    pub row_group_size: usize,

    /// Hard upper bound on rows per row group
    pub max_row_group_size: usize,

    /// Data page size in bytes
    pub data_page_size: usize,

    /// Dictionary page size limit in bytes
    pub dictionary_page_size_limit: usize,

    /// Whether to write column chunk statistics. Readers need the `neuron`
    /// min/max to skip row groups; without them every read is a full scan.
    pub write_statistics: bool,

    /// Enable BYTE_STREAM_SPLIT encoding for coordinate columns
    pub use_byte_stream_split: bool,

    /// Stable-sort records by id before packing so row groups cover narrow
    /// id ranges. Row order inside each record is always preserved.
    pub sort_by_id: bool,

    /// Container layout
    pub container_format: ContainerFormat,

    /// Replace an existing destination file when publishing
    pub overwrite: bool,

    /// Name of the primary table stream
    pub primary_table_name: String,
}

const MIB: usize = 1024 * 1024;

/// Coordinate-like float columns; these compress poorly as dictionaries
const FLOAT_COLUMNS: [&str; 8] = [
    columns::X,
    columns::Y,
    columns::Z,
    columns::RADIUS,
    columns::VEC_X,
    columns::VEC_Y,
    columns::VEC_Z,
    columns::ALPHA,
];

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::default(),
            row_group_size: 100_000,
            max_row_group_size: MIB,
            data_page_size: MIB,
            dictionary_page_size_limit: MIB,
            write_statistics: true,
            use_byte_stream_split: true,
            sort_by_id: true,
            container_format: ContainerFormat::Auto,
            overwrite: false,
            primary_table_name: DEFAULT_PRIMARY_TABLE.to_string(),
        }
    }
}

impl WriterConfig {
    fn preset(compression: CompressionType, row_group_size: usize, page_size: usize) -> Self {
        Self {
            compression,
            row_group_size,
            data_page_size: page_size,
            dictionary_page_size_limit: page_size,
            ..Self::default()
        }
    }

    /// ZSTD 22 with large row groups and pages
    pub fn max_compression() -> Self {
        Self::preset(CompressionType::Zstd(22), 500_000, 2 * MIB)
    }

    /// Snappy with small row groups; quickest to pack
    pub fn fast_write() -> Self {
        Self::preset(CompressionType::Snappy, 50_000, MIB / 2)
    }

    /// Same as [`WriterConfig::default`]
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Effective hard cap, never below the target
    pub(crate) fn row_group_cap(&self) -> usize {
        self.max_row_group_size.max(self.row_group_size).max(1)
    }

    /// Parquet properties for one table, with `footer` as its key/value metadata
    ///
    /// Coordinate encodings go only to float fields of `schema`, so a
    /// secondary table may use names like `x` for columns of any type.
    pub(crate) fn to_writer_properties(
        &self,
        schema: &Schema,
        id_column: &str,
        footer: &[(String, String)],
    ) -> WriterProperties {
        let statistics = match self.write_statistics {
            true => EnabledStatistics::Chunk,
            false => EnabledStatistics::None,
        };

        let mut builder = WriterProperties::builder()
            .set_compression(self.compression.codec())
            .set_data_page_size_limit(self.data_page_size)
            .set_dictionary_page_size_limit(self.dictionary_page_size_limit)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_cap());

        for field in schema.fields() {
            let name = field.name().as_str();
            if name == id_column {
                // The id repeats on every row of a record
                builder = builder.set_column_dictionary_enabled(column_path(name), true);
            } else if is_float_column(field) {
                builder = builder.set_column_dictionary_enabled(column_path(name), false);
                if self.use_byte_stream_split {
                    builder = builder.set_column_encoding(column_path(name), Encoding::BYTE_STREAM_SPLIT);
                }
            }
        }

        let footer = footer
            .iter()
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
            .collect();
        builder.set_key_value_metadata(Some(footer)).build()
    }
}

fn is_float_column(field: &Field) -> bool {
    FLOAT_COLUMNS.contains(&field.name().as_str()) && matches!(field.data_type(), DataType::Float32 | DataType::Float64)
}

fn column_path(name: &str) -> ColumnPath {
    ColumnPath::from(name)
}
