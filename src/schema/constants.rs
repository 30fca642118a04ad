/// morphpack format version - follows semantic versioning
pub const FORMAT_VERSION: &str = "1.0.0";

/// Namespace prefix for format-level footer keys
pub const FORMAT_NAMESPACE: &str = "morphpack";

/// Metadata key for format version in Parquet footer
pub const KEY_FORMAT_VERSION: &str = "morphpack:format_version";

/// Metadata key for the role of a table (`primary` / `secondary`)
pub const KEY_TABLE_ROLE: &str = "morphpack:table_role";

/// Metadata key for the stream name of a table
pub const KEY_TABLE_NAME: &str = "morphpack:table_name";

/// Metadata key for the record kind of a primary table
pub const KEY_KIND: &str = "morphpack:kind";

/// Metadata key for the declared id type
pub const KEY_ID_TYPE: &str = "morphpack:id_type";

/// Metadata key for the identifier column of a table
pub const KEY_ID_COLUMN: &str = "morphpack:id_column";

/// Metadata key for the number of records in a primary table
pub const KEY_RECORD_COUNT: &str = "morphpack:record_count";

/// Metadata key for the id grouping hint
pub const KEY_SORTED_BY_ID: &str = "morphpack:sorted_by_id";

/// Metadata key for the creation timestamp
pub const KEY_CREATED: &str = "morphpack:created";

/// Metadata key for writer software info
pub const KEY_WRITER: &str = "morphpack:writer";

/// Table role value for the primary table
pub const ROLE_PRIMARY: &str = "primary";

/// Table role value for secondary tables
pub const ROLE_SECONDARY: &str = "secondary";

/// Namespace of per-property type hints
pub const DTYPE_NAMESPACE: &str = "_dtype";

/// Prefix of per-property type hint keys
pub const DTYPE_PREFIX: &str = "_dtype:";

/// Namespace Arrow uses for its own footer entries
pub const ARROW_NAMESPACE: &str = "ARROW";

/// Key namespaces that never carry record metadata
pub const RESERVED_NAMESPACES: [&str; 3] = [FORMAT_NAMESPACE, ARROW_NAMESPACE, DTYPE_NAMESPACE];

/// Default primary table name inside archives
pub const DEFAULT_PRIMARY_TABLE: &str = "neurons";

/// File extension of table streams inside archives
pub const TABLE_EXTENSION: &str = ".parquet";

/// Prefix of the archive comment naming the primary entry
pub const ZIP_COMMENT_PRIMARY_PREFIX: &str = "morphpack:primary=";

/// Magic bytes opening a bare Parquet file
pub const PARQUET_MAGIC: &[u8; 4] = b"PAR1";

/// Magic bytes opening a ZIP archive
pub const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";
