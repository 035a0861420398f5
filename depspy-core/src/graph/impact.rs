//! Impact Graph
//!
//! The impact graph owns every module node of one build together with the
//! change classification sets derived from them. It is immutable once built:
//! a new build produces a new graph that replaces the old one wholesale.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::node::GraphNode;
use crate::error::{DepSpyError, Result};

/// The queryable module graph of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactGraph {
    /// All nodes indexed by relative id, in ingestion order.
    pub(super) nodes: IndexMap<String, Arc<GraphNode>>,

    /// Modules whose source changed.
    pub(super) git_changes: IndexSet<String>,

    /// Modules changed only as a consequence of upstream changes.
    pub(super) import_changes: IndexSet<String>,

    /// Modules whose evaluation changed without traceable named exports.
    pub(super) side_effect_changes: IndexSet<String>,
}

impl ImpactGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a node by graph id.
    pub fn get(&self, id: &str) -> Option<&Arc<GraphNode>> {
        self.nodes.get(id)
    }

    /// Get a node that a query requires to exist.
    pub fn require(&self, id: &str) -> Result<&Arc<GraphNode>> {
        self.nodes
            .get(id)
            .ok_or_else(|| DepSpyError::UnknownModule(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get the total number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Arc<GraphNode>> {
        self.nodes.values()
    }

    pub fn git_changes(&self) -> &IndexSet<String> {
        &self.git_changes
    }

    pub fn import_changes(&self) -> &IndexSet<String> {
        &self.import_changes
    }

    pub fn side_effect_changes(&self) -> &IndexSet<String> {
        &self.side_effect_changes
    }

    /// Total number of static and dynamic import edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.out_degree()).sum()
    }
}
