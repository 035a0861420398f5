//! Lazy Expander
//!
//! Grows one already rendered node by a single level, in place. Only the
//! materialized tree is searched; the rest of the graph is never walked.

use std::sync::Arc;

use tracing::{debug, trace};

use super::builder::OccurrenceCounter;
use super::node::TreeNode;
use crate::config::Direction;
use crate::error::Result;
use crate::graph::ImpactGraph;

/// Attach the next level below the node `tree_id` of `root`.
///
/// Returns `Ok(false)` without touching the tree when the node is not part
/// of it or already has children. New children are collapsed and their
/// paths extend the target's paths with the target's graph id. The target
/// itself is marked expanded.
pub fn expand_in_place(
    root: &mut TreeNode,
    tree_id: &str,
    graph: &ImpactGraph,
    occurrences: &mut OccurrenceCounter,
    direction: Direction,
) -> Result<bool> {
    let Some(target) = root.find_mut(tree_id) else {
        trace!(tree_id, "expand target is not in the current tree");
        return Ok(false);
    };
    if !target.children.is_empty() {
        trace!(tree_id, "expand target already has children");
        return Ok(false);
    }

    let graph_id = target.graph_id().to_string();
    let next = graph.next_level(&graph_id, direction)?;

    let mut paths = target.paths.clone();
    paths.push(graph_id.clone());

    for child_id in next.ids() {
        let module = Arc::clone(graph.require(child_id)?);
        let id = occurrences.mint(child_id);
        target
            .children
            .push(TreeNode::new(id, module, paths.clone(), true));
    }
    target.collapsed = false;

    debug!(tree_id, module = %graph_id, children = next.len(), "expanded tree node");
    Ok(true)
}
