use std::fmt;

use crate::archive::DanglingReference;
use crate::reader::ContainerKind;
use crate::writer::WriterStats;

/// Outcome of packing a collection
#[derive(Debug, Clone, PartialEq)]
pub struct PackReport {
    /// Statistics of the primary table
    pub stats: WriterStats,
    /// Secondary rows referencing records the collection lacks
    pub dangling: Vec<DanglingReference>,
    /// Layout that was produced
    pub format: ContainerKind,
    /// Number of secondary tables written
    pub secondary_tables: usize,
}

impl fmt::Display for PackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} container, {} secondary tables, {} bytes",
            self.stats, self.format, self.secondary_tables, self.stats.file_size_bytes
        )?;
        if !self.dangling.is_empty() {
            write!(f, ", {} dangling references", self.dangling.len())?;
        }
        write!(f, ")")
    }
}
