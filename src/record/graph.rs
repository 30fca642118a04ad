use std::collections::{HashMap, HashSet, VecDeque};

use super::SkeletonNode;

/// Violation of the skeleton forest invariants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A node id occurs more than once
    #[error("duplicate node_id {0}")]
    DuplicateNode(i64),

    /// A node points at a parent that is not part of the skeleton
    #[error("node {node} references missing parent {parent}")]
    DanglingParent {
        /// The offending node
        node: i64,
        /// The parent id it references
        parent: i64,
    },

    /// Nodes that can never reach a root
    #[error("parent cycle through nodes {0:?}")]
    Cycle(Vec<i64>),
}

/// Parent/child adjacency of a validated skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkeletonGraph {
    roots: Vec<i64>,
    parents: HashMap<i64, i64>,
    children: HashMap<i64, Vec<i64>>,
}

impl SkeletonGraph {
    /// Build the adjacency for `nodes`.
    ///
    /// Every violation is collected: duplicate ids, parents outside the
    /// skeleton, and groups of nodes that loop without reaching a root.
    pub fn build(nodes: &[SkeletonNode]) -> Result<Self, Vec<GraphError>> {
        let mut errors = Vec::new();
        let mut seen = HashSet::with_capacity(nodes.len());
        let mut reported = HashSet::new();
        for node in nodes {
            if !seen.insert(node.node_id) && reported.insert(node.node_id) {
                errors.push(GraphError::DuplicateNode(node.node_id));
            }
        }

        let mut graph = SkeletonGraph::default();
        // Traversal starts at roots and at nodes whose parent is missing, so
        // that only true loops are left unvisited.
        let mut starts = Vec::new();
        for node in nodes {
            match node.parent_id {
                None => {
                    graph.roots.push(node.node_id);
                    starts.push(node.node_id);
                }
                Some(parent) if !seen.contains(&parent) => {
                    errors.push(GraphError::DanglingParent {
                        node: node.node_id,
                        parent,
                    });
                    starts.push(node.node_id);
                }
                Some(parent) => {
                    graph.parents.insert(node.node_id, parent);
                    graph.children.entry(parent).or_default().push(node.node_id);
                }
            }
        }

        let mut visited = HashSet::with_capacity(nodes.len());
        let mut queue: VecDeque<i64> = starts.into_iter().collect();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(children) = graph.children.get(&id) {
                queue.extend(children.iter().copied());
            }
        }

        let mut looped: Vec<i64> = nodes
            .iter()
            .map(|n| n.node_id)
            .filter(|id| !visited.contains(id))
            .collect();
        if !looped.is_empty() {
            looped.sort_unstable();
            looped.dedup();
            errors.push(GraphError::Cycle(looped));
        }

        if errors.is_empty() {
            Ok(graph)
        } else {
            Err(errors)
        }
    }

    /// Root node ids in node order
    pub fn roots(&self) -> &[i64] {
        &self.roots
    }

    /// Children of a node in node order
    pub fn children(&self, node_id: i64) -> &[i64] {
        self.children.get(&node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parent of a node, `None` for roots
    pub fn parent(&self, node_id: i64) -> Option<i64> {
        self.parents.get(&node_id).copied()
    }

    /// Nodes without children
    pub fn leaves<'a>(&'a self, nodes: &'a [SkeletonNode]) -> impl Iterator<Item = i64> + 'a {
        nodes
            .iter()
            .map(|n| n.node_id)
            .filter(move |id| !self.children.contains_key(id))
    }
}
