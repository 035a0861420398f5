//! Tree Builder
//!
//! Materializes a depth-bounded impact tree rooted at one module.
//!
//! # Algorithm
//!
//! Depth-first construction over [`ImpactGraph::next_level`]:
//!
//! 1. Every visit mints a fresh tree id from the occurrence counter.
//! 2. Nodes on the last permitted level are created collapsed and not
//!    expanded; the UI expands them lazily.
//! 3. A node whose graph id is already on the current path closes a cycle.
//!    It is shown, removed from the path and not expanded.
//! 4. Otherwise the id joins the path while its children are built and
//!    leaves it afterwards, so the same module can reappear on a sibling
//!    branch.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{debug, trace};

use super::node::TreeNode;
use crate::config::Direction;
use crate::error::{DepSpyError, Result};
use crate::graph::ImpactGraph;
use crate::paths;

/// Counts how often each graph id was placed in the current tree.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceCounter {
    counts: HashMap<String, usize>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all counts. Called when a new tree is built.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Record one more occurrence of `graph_id` and return its tree id.
    pub fn mint(&mut self, graph_id: &str) -> String {
        let count = self.counts.entry(graph_id.to_string()).or_insert(0);
        *count += 1;
        paths::tree_id(graph_id, *count)
    }

    /// Occurrences of `graph_id` so far.
    pub fn count(&self, graph_id: &str) -> usize {
        self.counts.get(graph_id).copied().unwrap_or(0)
    }
}

/// Builds one tree against a graph, sharing the session's counter.
pub struct TreeBuilder<'a> {
    graph: &'a ImpactGraph,
    occurrences: &'a mut OccurrenceCounter,
    direction: Direction,
    max_level: usize,
    /// Graph ids from the root to the frame being built.
    path: IndexSet<String>,
}

impl<'a> TreeBuilder<'a> {
    /// Create a builder. `max_level` must be at least 1.
    pub fn new(
        graph: &'a ImpactGraph,
        occurrences: &'a mut OccurrenceCounter,
        direction: Direction,
        max_level: usize,
    ) -> Result<Self> {
        if max_level == 0 {
            return Err(DepSpyError::InvalidMaxLevel(max_level));
        }
        Ok(Self {
            graph,
            occurrences,
            direction,
            max_level,
            path: IndexSet::new(),
        })
    }

    /// Build the tree rooted at `entry_id`, resetting the occurrence counter.
    pub fn build(mut self, entry_id: &str) -> Result<TreeNode> {
        self.graph.require(entry_id)?;
        self.occurrences.reset();

        let root = self.build_node(entry_id, 0)?;
        debug!(
            root = entry_id,
            direction = ?self.direction,
            max_level = self.max_level,
            nodes = root.len(),
            "built impact tree"
        );
        Ok(root)
    }

    fn build_node(&mut self, graph_id: &str, level: usize) -> Result<TreeNode> {
        let module = Arc::clone(self.graph.require(graph_id)?);
        let id = self.occurrences.mint(graph_id);
        let ancestors = self.path.iter().cloned().collect();
        let mut node = TreeNode::new(id, module, ancestors, false);

        if level + 1 >= self.max_level {
            node.collapsed = true;
            return Ok(node);
        }

        if self.path.contains(graph_id) {
            trace!(module = graph_id, level, "cycle closed, not expanding");
            self.path.shift_remove(graph_id);
            return Ok(node);
        }

        self.path.insert(graph_id.to_string());
        let next = self.graph.next_level(graph_id, self.direction)?;
        for child_id in next.ids() {
            let child = self.build_node(child_id, level + 1)?;
            node.children.push(child);
        }
        self.path.shift_remove(graph_id);

        Ok(node)
    }
}
