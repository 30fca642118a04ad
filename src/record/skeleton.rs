use super::{ExtraColumns, GraphError, RecordId, SkeletonGraph};

/// Parent id marking a root node at rest.
pub const ROOT_PARENT: i64 = -1;

/// One node of a skeleton tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonNode {
    /// Node id, unique within its skeleton
    pub node_id: i64,
    /// Parent node id, `None` for roots
    pub parent_id: Option<i64>,
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
    /// Z coordinate
    pub z: f32,
    /// Optional radius
    pub radius: Option<f32>,
}

impl SkeletonNode {
    /// Create a node from its at-rest form, where `parent_id == -1` marks a root.
    pub fn new(node_id: i64, parent_id: i64, x: f32, y: f32, z: f32) -> Self {
        Self {
            node_id,
            parent_id: (parent_id != ROOT_PARENT).then_some(parent_id),
            x,
            y,
            z,
            radius: None,
        }
    }

    /// Create a root node
    pub fn root(node_id: i64, x: f32, y: f32, z: f32) -> Self {
        Self::new(node_id, ROOT_PARENT, x, y, z)
    }

    /// Set the radius
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// True if the node has no parent
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Parent id as stored in the table
    pub fn stored_parent(&self) -> i64 {
        self.parent_id.unwrap_or(ROOT_PARENT)
    }
}

/// A tree-structured neuron morphology.
///
/// Node order is preserved through a pack/unpack cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// Record identifier
    pub id: RecordId,
    /// Nodes in their original order
    pub nodes: Vec<SkeletonNode>,
    /// Pass-through per-node columns
    pub extra: ExtraColumns,
}

impl Skeleton {
    /// Create a skeleton without extra columns
    pub fn new(id: impl Into<RecordId>, nodes: Vec<SkeletonNode>) -> Self {
        Self {
            id: id.into(),
            nodes,
            extra: ExtraColumns::new(),
        }
    }

    /// Attach pass-through columns
    pub fn with_extra(mut self, extra: ExtraColumns) -> Self {
        self.extra = extra;
        self
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the skeleton has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the parent/child adjacency, checking the forest invariants.
    pub fn graph(&self) -> Result<SkeletonGraph, Vec<GraphError>> {
        SkeletonGraph::build(&self.nodes)
    }
}
