use std::fmt;

/// Statistics from a completed write operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Number of records written to the primary table
    pub records_written: usize,
    /// Total number of rows written
    pub rows_written: usize,
    /// Number of Parquet row groups written
    pub row_groups_written: usize,
    /// Size of the written stream in bytes
    pub file_size_bytes: u64,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} records ({} rows) in {} row groups",
            self.records_written, self.rows_written, self.row_groups_written
        )
    }
}
