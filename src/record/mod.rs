//! Neuron record data model
//!
//! A collection holds records of a single [`NeuronKind`]: tree-structured
//! [`Skeleton`]s or point-cloud [`Dotprops`]. Every record is identified by a
//! [`RecordId`] that becomes the value of the reserved `neuron` column when
//! the collection is packed into a table.

mod columns;
mod dotprops;
mod graph;
mod id;
mod skeleton;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use columns::ExtraColumns;
pub use dotprops::Dotprops;
pub use graph::{GraphError, SkeletonGraph};
pub use id::{IdType, RecordId};
pub use skeleton::{Skeleton, SkeletonNode, ROOT_PARENT};

/// Kind of record stored in a primary table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeuronKind {
    /// Tree-structured skeletons
    Skeleton,
    /// Point clouds with tangent vectors
    Dotprops,
}

impl NeuronKind {
    /// Footer representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NeuronKind::Skeleton => "skeleton",
            NeuronKind::Dotprops => "dotprops",
        }
    }

    /// Parse the footer representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "skeleton" => Some(NeuronKind::Skeleton),
            "dotprops" => Some(NeuronKind::Dotprops),
            _ => None,
        }
    }
}

impl fmt::Display for NeuronKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single neuron record
#[derive(Debug, Clone, PartialEq)]
pub enum Neuron {
    /// Skeleton record
    Skeleton(Skeleton),
    /// Dotprops record
    Dotprops(Dotprops),
}

impl Neuron {
    /// Record identifier
    pub fn id(&self) -> &RecordId {
        match self {
            Neuron::Skeleton(s) => &s.id,
            Neuron::Dotprops(d) => &d.id,
        }
    }

    /// Record kind
    pub fn kind(&self) -> NeuronKind {
        match self {
            Neuron::Skeleton(_) => NeuronKind::Skeleton,
            Neuron::Dotprops(_) => NeuronKind::Dotprops,
        }
    }

    /// Number of table rows this record occupies
    pub fn row_count(&self) -> usize {
        match self {
            Neuron::Skeleton(s) => s.len(),
            Neuron::Dotprops(d) => d.len(),
        }
    }

    /// Pass-through columns
    pub fn extra(&self) -> &ExtraColumns {
        match self {
            Neuron::Skeleton(s) => &s.extra,
            Neuron::Dotprops(d) => &d.extra,
        }
    }

    /// Borrow as a skeleton
    pub fn as_skeleton(&self) -> Option<&Skeleton> {
        match self {
            Neuron::Skeleton(s) => Some(s),
            Neuron::Dotprops(_) => None,
        }
    }

    /// Borrow as dotprops
    pub fn as_dotprops(&self) -> Option<&Dotprops> {
        match self {
            Neuron::Dotprops(d) => Some(d),
            Neuron::Skeleton(_) => None,
        }
    }
}

impl From<Skeleton> for Neuron {
    fn from(value: Skeleton) -> Self {
        Neuron::Skeleton(value)
    }
}

impl From<Dotprops> for Neuron {
    fn from(value: Dotprops) -> Self {
        Neuron::Dotprops(value)
    }
}
