//! Tree Nodes
//!
//! A tree node is one appearance of a graph node in a rendered impact tree.
//! The same module may appear several times in one tree, once per distinct
//! path, so tree nodes carry their own id.

use std::sync::Arc;

use serde::Serialize;

use crate::graph::GraphNode;
use crate::paths;

/// One node of a rendered impact tree.
///
/// Serializes to the renderer's shape: the graph node's fields flattened
/// next to `id`, `paths`, `children` and `collapsed`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Graph id plus occurrence suffix, unique within one tree.
    pub id: String,

    #[serde(flatten)]
    module: Arc<GraphNode>,

    /// Graph ids on the path from the root down to this node's parent.
    pub paths: Vec<String>,

    pub children: Vec<TreeNode>,

    /// Whether the renderer should show this node folded.
    pub collapsed: bool,
}

impl TreeNode {
    pub(crate) fn new(id: String, module: Arc<GraphNode>, paths: Vec<String>, collapsed: bool) -> Self {
        Self {
            id,
            module,
            paths,
            children: Vec::new(),
            collapsed,
        }
    }

    /// The graph node this tree node shows.
    pub fn module(&self) -> &GraphNode {
        &self.module
    }

    pub fn graph_id(&self) -> &str {
        self.module.id()
    }

    /// Short label the renderer draws for this node.
    pub fn label(&self) -> String {
        paths::display_name(self.module.id())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Visit every node depth-first, parents before children.
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&TreeNode),
    {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Find a node by tree id among the nodes materialized so far.
    pub fn find(&self, tree_id: &str) -> Option<&TreeNode> {
        if self.id == tree_id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(tree_id))
    }

    pub fn find_mut(&mut self, tree_id: &str) -> Option<&mut TreeNode> {
        if self.id == tree_id {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(tree_id))
    }

    /// Number of nodes in this subtree, including itself.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TreeNode::len).sum::<usize>()
    }

    /// Depth of the deepest node below this one; a lone node has depth 0.
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}
